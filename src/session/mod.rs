//! Learning sessions

pub mod generator;

pub use generator::{
    generate_session, Session, SessionError, SessionGenerator, SessionObserver, DEFAULT_MASTERY_THRESHOLD,
};
