//! Domain models shared by the auth core and the storage backends.

pub mod auth;
