pub mod consulta;
pub mod crm;
pub mod financeiro;
pub mod indicadores;
pub mod obras;
