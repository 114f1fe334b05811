pub mod cliente;

pub use cliente::{AtualizaCliente, Cliente, ClienteId, NovoCliente};
