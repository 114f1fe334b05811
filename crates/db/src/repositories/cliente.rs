//! SQLite-backed implementation of the customer storage port.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use clientes_core::directory::ClienteRepository;
use clientes_core::domain::cliente::{Cliente, ClienteId, NovoCliente};
use clientes_core::errors::StoreError;

use crate::DbPool;

const SELECT_FIELDS: &str =
    "id, cpf_cnpj, nome, email, telefone, cep, numero, complemento, created_at";

pub struct SqlClienteRepository {
    pool: DbPool,
}

impl SqlClienteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_by_column(&self, column: &str, value: &str) -> Result<Option<Cliente>, StoreError> {
        let query = format!("SELECT {SELECT_FIELDS} FROM cliente WHERE {column} = ?");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_error)?;

        row.as_ref().map(decode_row).transpose()
    }
}

#[async_trait::async_trait]
impl ClienteRepository for SqlClienteRepository {
    async fn find_by_id(&self, id: &ClienteId) -> Result<Option<Cliente>, StoreError> {
        self.find_by_column("id", &id.to_string()).await
    }

    async fn find_by_cpf_cnpj(&self, cpf_cnpj: &str) -> Result<Option<Cliente>, StoreError> {
        self.find_by_column("cpf_cnpj", cpf_cnpj).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Cliente>, StoreError> {
        self.find_by_column("email", email).await
    }

    async fn list_all(&self) -> Result<Vec<Cliente>, StoreError> {
        // rowid preserves insertion order.
        let rows = sqlx::query(&format!("SELECT {SELECT_FIELDS} FROM cliente ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_error)?;

        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, novo: NovoCliente) -> Result<Cliente, StoreError> {
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

        sqlx::query(
            "INSERT INTO cliente
                (id, cpf_cnpj, nome, email, telefone, cep, numero, complemento, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(cliente.id.to_string())
        .bind(&cliente.cpf_cnpj)
        .bind(&cliente.nome)
        .bind(&cliente.email)
        .bind(&cliente.telefone)
        .bind(&cliente.cep)
        .bind(&cliente.numero)
        .bind(&cliente.complemento)
        .bind(cliente.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_error)?;

        Ok(cliente)
    }

    async fn update(&self, cliente: &Cliente) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE cliente
             SET cpf_cnpj = ?, nome = ?, email = ?, telefone = ?, cep = ?, numero = ?,
                 complemento = ?
             WHERE id = ?",
        )
        .bind(&cliente.cpf_cnpj)
        .bind(&cliente.nome)
        .bind(&cliente.email)
        .bind(&cliente.telefone)
        .bind(&cliente.cep)
        .bind(&cliente.numero)
        .bind(&cliente.complemento)
        .bind(cliente.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!("no cliente row with id {}", cliente.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &ClienteId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cliente WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_error)?;
        Ok(())
    }
}

fn map_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            // SQLite reports "UNIQUE constraint failed: cliente.cpf_cnpj";
            // keep the table.column tail so the service can tell which key
            // collided.
            let message = db_error.message();
            let constraint = message.rsplit(':').next().unwrap_or(message).trim().to_string();
            return StoreError::UniqueViolation { constraint };
        }
    }
    StoreError::Backend(error.to_string())
}

fn decode_row(row: &SqliteRow) -> Result<Cliente, StoreError> {
    let id: String = try_get(row, "id")?;
    let id = Uuid::parse_str(&id)
        .map_err(|error| StoreError::Backend(format!("invalid uuid in cliente.id: {error}")))?;

    let created_at: String = try_get(row, "created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|error| {
            StoreError::Backend(format!("invalid timestamp in cliente.created_at: {error}"))
        })?
        .with_timezone(&Utc);

    Ok(Cliente {
        id: ClienteId(id),
        cpf_cnpj: try_get(row, "cpf_cnpj")?,
        nome: try_get(row, "nome")?,
        email: try_get(row, "email")?,
        telefone: try_get(row, "telefone")?,
        cep: try_get(row, "cep")?,
        numero: try_get(row, "numero")?,
        complemento: try_get(row, "complemento")?,
        created_at,
    })
}

fn try_get<'r, T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, StoreError> {
    row.try_get(column)
        .map_err(|error| StoreError::Backend(format!("decode of cliente.{column} failed: {error}")))
}

#[cfg(test)]
mod tests {
    use clientes_core::directory::ClienteRepository;
    use clientes_core::domain::cliente::NovoCliente;
    use clientes_core::errors::StoreError;

    use super::SqlClienteRepository;
    use crate::{connect_with_settings, migrations};

    async fn repository() -> SqlClienteRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlClienteRepository::new(pool)
    }

    fn novo(cpf_cnpj: &str, email: &str) -> NovoCliente {
        NovoCliente {
            cpf_cnpj: cpf_cnpj.to_string(),
            nome: "Teste Cliente".to_string(),
            email: email.to_string(),
            telefone: Some("11999999999".to_string()),
            cep: None,
            numero: None,
            complemento: None,
        }
    }

    #[tokio::test]
    async fn insert_then_lookup_by_every_key() {
        let repo = repository().await;
        let cliente = repo.insert(novo("12345678900", "teste@cliente.com")).await.expect("insert");

        let by_id = repo.find_by_id(&cliente.id).await.expect("by id");
        let by_cpf = repo.find_by_cpf_cnpj("12345678900").await.expect("by cpf");
        let by_email = repo.find_by_email("teste@cliente.com").await.expect("by email");

        // RFC 3339 round-trip keeps sub-second precision.
        assert_eq!(by_id.as_ref(), Some(&cliente));
        assert_eq!(by_cpf, by_id);
        assert_eq!(by_email, by_id);
    }

    #[tokio::test]
    async fn optional_fields_round_trip_as_none() {
        let repo = repository().await;
        let cliente = repo.insert(novo("12345678900", "teste@cliente.com")).await.expect("insert");

        let fetched = repo.find_by_id(&cliente.id).await.expect("find").expect("present");
        assert_eq!(fetched.cep, None);
        assert_eq!(fetched.numero, None);
        assert_eq!(fetched.complemento, None);
    }

    #[tokio::test]
    async fn unique_indexes_surface_as_unique_violations() {
        let repo = repository().await;
        repo.insert(novo("12345678900", "a@cliente.com")).await.expect("first insert");

        let cpf_clash = repo.insert(novo("12345678900", "b@cliente.com")).await;
        match cpf_clash {
            Err(StoreError::UniqueViolation { constraint }) => {
                assert!(constraint.contains("cpf_cnpj"), "got constraint `{constraint}`");
            }
            other => panic!("expected unique violation, got {other:?}"),
        }

        let email_clash = repo.insert(novo("99999999999", "a@cliente.com")).await;
        match email_clash {
            Err(StoreError::UniqueViolation { constraint }) => {
                assert!(constraint.contains("email"), "got constraint `{constraint}`");
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_rewrites_mutable_columns() {
        let repo = repository().await;
        let mut cliente =
            repo.insert(novo("12345678900", "a@cliente.com")).await.expect("insert");

        cliente.nome = "Novo Nome".to_string();
        cliente.telefone = None;
        repo.update(&cliente).await.expect("update");

        let fetched = repo.find_by_id(&cliente.id).await.expect("find").expect("present");
        assert_eq!(fetched.nome, "Novo Nome");
        assert_eq!(fetched.telefone, None);
        assert_eq!(fetched.created_at, cliente.created_at);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_a_backend_error() {
        let repo = repository().await;
        let cliente = repo.insert(novo("12345678900", "a@cliente.com")).await.expect("insert");
        repo.delete(&cliente.id).await.expect("delete");

        let result = repo.update(&cliente).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn list_all_preserves_insertion_order() {
        let repo = repository().await;
        let mut created = Vec::new();
        for n in 0..4 {
            created.push(
                repo.insert(novo(&format!("{n}0000000000"), &format!("c{n}@cliente.com")))
                    .await
                    .expect("insert"),
            );
        }

        let all = repo.list_all().await.expect("list");
        assert_eq!(all, created);
    }

    #[tokio::test]
    async fn delete_is_a_hard_delete() {
        let repo = repository().await;
        let cliente = repo.insert(novo("12345678900", "a@cliente.com")).await.expect("insert");

        repo.delete(&cliente.id).await.expect("delete");
        assert_eq!(repo.find_by_id(&cliente.id).await.expect("find"), None);
        assert!(repo.list_all().await.expect("list").is_empty());
    }
}
