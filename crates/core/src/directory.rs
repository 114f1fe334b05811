//! Customer directory service: uniqueness enforcement and CRUD
//! orchestration over an injected storage port.

use async_trait::async_trait;
use tracing::info;

use crate::domain::cliente::{AtualizaCliente, Cliente, ClienteId, NovoCliente};
use crate::errors::{ClienteError, StoreError};

/// Storage port for customer records. The implementation owns durable
/// state and assigns `id`/`created_at` at insertion time.
#[async_trait]
pub trait ClienteRepository: Send + Sync {
    async fn find_by_id(&self, id: &ClienteId) -> Result<Option<Cliente>, StoreError>;
    async fn find_by_cpf_cnpj(&self, cpf_cnpj: &str) -> Result<Option<Cliente>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Cliente>, StoreError>;
    /// All records in insertion order.
    async fn list_all(&self) -> Result<Vec<Cliente>, StoreError>;
    async fn insert(&self, novo: NovoCliente) -> Result<Cliente, StoreError>;
    async fn update(&self, cliente: &Cliente) -> Result<(), StoreError>;
    async fn delete(&self, id: &ClienteId) -> Result<(), StoreError>;
}

/// Stateless orchestration over the port: every operation re-reads current
/// state, performs its duplicate/not-found checks, and issues at most one
/// write. The duplicate pre-checks are a fast-fail courtesy; the storage
/// unique indexes remain the authoritative guard (see [`StoreError`]).
pub struct ClienteService<R> {
    repo: R,
}

impl<R: ClienteRepository> ClienteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: NovoCliente) -> Result<Cliente, ClienteError> {
        if self.repo.find_by_cpf_cnpj(&input.cpf_cnpj).await?.is_some() {
            return Err(ClienteError::DuplicateCpfCnpj);
        }
        if self.repo.find_by_email(&input.email).await?.is_some() {
            return Err(ClienteError::DuplicateEmail);
        }

        let cliente = self.repo.insert(input).await.map_err(map_write_error)?;
        info!(
            event_name = "cliente.created",
            cliente_id = %cliente.id,
            "cliente record created"
        );
        Ok(cliente)
    }

    pub async fn find_all(&self) -> Result<Vec<Cliente>, ClienteError> {
        Ok(self.repo.list_all().await?)
    }

    pub async fn find_one(&self, id: &ClienteId) -> Result<Cliente, ClienteError> {
        self.repo.find_by_id(id).await?.ok_or(ClienteError::NotFound)
    }

    pub async fn update(
        &self,
        id: &ClienteId,
        patch: AtualizaCliente,
    ) -> Result<Cliente, ClienteError> {
        let current = self.repo.find_by_id(id).await?.ok_or(ClienteError::NotFound)?;

        // A record keeping its own key is not a duplicate.
        if let Some(cpf_cnpj) = &patch.cpf_cnpj {
            if let Some(existing) = self.repo.find_by_cpf_cnpj(cpf_cnpj).await? {
                if existing.id != current.id {
                    return Err(ClienteError::DuplicateCpfCnpj);
                }
            }
        }
        if let Some(email) = &patch.email {
            if let Some(existing) = self.repo.find_by_email(email).await? {
                if existing.id != current.id {
                    return Err(ClienteError::DuplicateEmail);
                }
            }
        }

        let updated = current.merged(&patch);
        self.repo.update(&updated).await.map_err(map_write_error)?;
        info!(
            event_name = "cliente.updated",
            cliente_id = %updated.id,
            "cliente record updated"
        );
        Ok(updated)
    }

    pub async fn remove(&self, id: &ClienteId) -> Result<Cliente, ClienteError> {
        let current = self.repo.find_by_id(id).await?.ok_or(ClienteError::NotFound)?;
        self.repo.delete(id).await?;
        info!(
            event_name = "cliente.deleted",
            cliente_id = %current.id,
            "cliente record deleted"
        );
        Ok(current)
    }
}

/// Map a storage unique-violation (the race-loser path) onto the same
/// duplicate error the pre-check would have produced.
fn map_write_error(error: StoreError) -> ClienteError {
    match &error {
        StoreError::UniqueViolation { constraint } if constraint.contains("cpf_cnpj") => {
            ClienteError::DuplicateCpfCnpj
        }
        StoreError::UniqueViolation { constraint } if constraint.contains("email") => {
            ClienteError::DuplicateEmail
        }
        _ => ClienteError::Store(error),
    }
}
