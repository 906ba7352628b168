//! GIF frame encoding.
//!
//! The encoder is consumed through a two-phase contract: `begin` opens an
//! [`EncoderSession`](encoder_trait::EncoderSession), frames are pushed while
//! recording, and `finish` produces the final artifact. The session is the
//! single source of truth for the artifact; callers must await `finish`
//! rather than assume stop and artifact availability are synchronous.

pub mod encoder_trait;
pub mod gif_encoder;
pub mod types;

pub use encoder_trait::{EncoderSession, FrameEncoder};
pub use gif_encoder::{GifEncoderSession, GifFrameEncoder};
pub use types::{Artifact, EncoderSettings};
