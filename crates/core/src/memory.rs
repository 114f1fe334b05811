//! In-memory implementation of the storage port, used by service-level
//! tests. Mirrors the SQL store's behavior, including the unique-index
//! backstop on `cpf_cnpj` and `email`.

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::directory::ClienteRepository;
use crate::domain::cliente::{Cliente, ClienteId, NovoCliente};
use crate::errors::StoreError;

#[derive(Default)]
pub struct InMemoryClienteRepository {
    // Vec keeps insertion order, matching the SQL store's rowid ordering.
    clientes: RwLock<Vec<Cliente>>,
}

#[async_trait::async_trait]
impl ClienteRepository for InMemoryClienteRepository {
    async fn find_by_id(&self, id: &ClienteId) -> Result<Option<Cliente>, StoreError> {
        let clientes = self.clientes.read().await;
        Ok(clientes.iter().find(|c| c.id == *id).cloned())
    }

    async fn find_by_cpf_cnpj(&self, cpf_cnpj: &str) -> Result<Option<Cliente>, StoreError> {
        let clientes = self.clientes.read().await;
        Ok(clientes.iter().find(|c| c.cpf_cnpj == cpf_cnpj).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Cliente>, StoreError> {
        let clientes = self.clientes.read().await;
        Ok(clientes.iter().find(|c| c.email == email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Cliente>, StoreError> {
        let clientes = self.clientes.read().await;
        Ok(clientes.clone())
    }

    async fn insert(&self, novo: NovoCliente) -> Result<Cliente, StoreError> {
        let mut clientes = self.clientes.write().await;
        check_unique(&clientes, None, &novo.cpf_cnpj, &novo.email)?;

        let cliente = Cliente {
            id: ClienteId(Uuid::new_v4()),
            cpf_cnpj: novo.cpf_cnpj,
            nome: novo.nome,
            email: novo.email,
            telefone: novo.telefone,
            cep: novo.cep,
            numero: novo.numero,
            complemento: novo.complemento,
            created_at: Utc::now(),
        };
        clientes.push(cliente.clone());
        Ok(cliente)
    }

    async fn update(&self, cliente: &Cliente) -> Result<(), StoreError> {
        let mut clientes = self.clientes.write().await;
        check_unique(&clientes, Some(&cliente.id), &cliente.cpf_cnpj, &cliente.email)?;

        match clientes.iter_mut().find(|c| c.id == cliente.id) {
            Some(slot) => {
                *slot = cliente.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!("no cliente row with id {}", cliente.id))),
        }
    }

    async fn delete(&self, id: &ClienteId) -> Result<(), StoreError> {
        let mut clientes = self.clientes.write().await;
        clientes.retain(|c| c.id != *id);
        Ok(())
    }
}

fn check_unique(
    clientes: &[Cliente],
    exclude: Option<&ClienteId>,
    cpf_cnpj: &str,
    email: &str,
) -> Result<(), StoreError> {
    let others = clientes.iter().filter(|c| exclude != Some(&c.id));
    for other in others {
        if other.cpf_cnpj == cpf_cnpj {
            return Err(StoreError::UniqueViolation { constraint: "cliente.cpf_cnpj".to_string() });
        }
        if other.email == email {
            return Err(StoreError::UniqueViolation { constraint: "cliente.email".to_string() });
        }
    }
    Ok(())
}
