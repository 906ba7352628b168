use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use log::info;

use crate::error_handling::types::WebError;
use crate::storage::store_trait::AssetStore;
use crate::upload::gateway_trait::UploadGateway;
use crate::web_interface::routes;

/// Web server for the HTTP API and dashboard.
pub struct WebServer {
    store: Arc<dyn AssetStore>,
    gateway: Arc<dyn UploadGateway>,
}

impl WebServer {
    /// Create a new WebServer instance over injected collaborators.
    pub fn new(store: Arc<dyn AssetStore>, gateway: Arc<dyn UploadGateway>) -> Self {
        Self { store, gateway }
    }

    /// Serve the API on the given address until the process exits.
    pub async fn start(&self, bind_address: IpAddr, port: u16) -> Result<(), WebError> {
        let routes = routes::routes(self.store.clone(), self.gateway.clone());
        let addr: SocketAddr = (bind_address, port).into();
        info!("gallery API listening on http://{}", addr);
        warp::serve(routes).run(addr).await;
        Ok(())
    }
}
