pub mod conversao;
pub use conversao::ConversaoService;
pub mod crm_service;
pub use crm_service::CrmService;
pub mod financeiro_service;
pub use financeiro_service::FinanceiroService;
pub mod indicadores;
pub use indicadores::FonteIndicadores;
pub mod obras_service;
pub use obras_service::ObrasService;
pub mod parcelas;
