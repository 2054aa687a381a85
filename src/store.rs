pub mod client;
pub use client::Store;
pub mod params;
pub use params::{Busca, ListaParams, TODOS};
