pub mod config;
pub mod directory;
pub mod domain;
pub mod errors;
pub mod memory;
pub mod validation;

pub use directory::{ClienteRepository, ClienteService};
pub use domain::cliente::{AtualizaCliente, Cliente, ClienteId, NovoCliente};
pub use errors::{ClienteError, StoreError, ValidationError, Violation};
pub use memory::InMemoryClienteRepository;
