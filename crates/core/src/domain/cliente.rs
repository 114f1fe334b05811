use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClienteId(pub Uuid);

impl std::fmt::Display for ClienteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer record. Field names match the public API wire format
/// (CPF/CNPJ is the Brazilian taxpayer identifier, treated as opaque).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cliente {
    pub id: ClienteId,
    pub cpf_cnpj: String,
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creation input. `id` and `created_at` are assigned by the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovoCliente {
    pub cpf_cnpj: String,
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
}

/// Partial-update input: only supplied fields are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtualizaCliente {
    pub cpf_cnpj: Option<String>,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
}

impl Cliente {
    /// Merge a partial update into this record; unspecified fields keep
    /// their prior value.
    pub fn merged(&self, patch: &AtualizaCliente) -> Cliente {
        Cliente {
            id: self.id,
            cpf_cnpj: patch.cpf_cnpj.clone().unwrap_or_else(|| self.cpf_cnpj.clone()),
            nome: patch.nome.clone().unwrap_or_else(|| self.nome.clone()),
            email: patch.email.clone().unwrap_or_else(|| self.email.clone()),
            telefone: patch.telefone.clone().or_else(|| self.telefone.clone()),
            cep: patch.cep.clone().or_else(|| self.cep.clone()),
            numero: patch.numero.clone().or_else(|| self.numero.clone()),
            complemento: patch.complemento.clone().or_else(|| self.complemento.clone()),
            created_at: self.created_at,
        }
    }
}
