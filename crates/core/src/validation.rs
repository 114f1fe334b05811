//! Structural payload validation, run before the directory service.
//!
//! Each route payload is checked against a declarative schema: unrecognized
//! fields are rejected, values must be JSON strings, required fields must
//! be present and non-empty, and `email` must be syntactically valid. All
//! violations are aggregated; the core service never sees a payload that
//! failed here.

use serde_json::Value;

use crate::errors::{ValidationError, Violation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Whether an empty string is acceptable when the field is supplied.
    pub allow_empty: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct PayloadSchema {
    pub rules: &'static [FieldRule],
}

const fn rule(name: &'static str, kind: FieldKind, required: bool, allow_empty: bool) -> FieldRule {
    FieldRule { name, kind, required, allow_empty }
}

/// Schema for `POST /clientes`.
pub const CREATE: PayloadSchema = PayloadSchema {
    rules: &[
        rule("cpf_cnpj", FieldKind::Text, true, false),
        rule("nome", FieldKind::Text, true, false),
        rule("email", FieldKind::Email, true, false),
        rule("telefone", FieldKind::Text, false, true),
        rule("cep", FieldKind::Text, false, true),
        rule("numero", FieldKind::Text, false, true),
        rule("complemento", FieldKind::Text, false, true),
    ],
};

/// Schema for `PATCH /clientes/{id}`: same fields, nothing required, but
/// supplied values are still type- and format-checked.
pub const UPDATE: PayloadSchema = PayloadSchema {
    rules: &[
        rule("cpf_cnpj", FieldKind::Text, false, false),
        rule("nome", FieldKind::Text, false, false),
        rule("email", FieldKind::Email, false, false),
        rule("telefone", FieldKind::Text, false, true),
        rule("cep", FieldKind::Text, false, true),
        rule("numero", FieldKind::Text, false, true),
        rule("complemento", FieldKind::Text, false, true),
    ],
};

impl PayloadSchema {
    pub fn check(&self, payload: &Value) -> Result<(), ValidationError> {
        let Some(object) = payload.as_object() else {
            return Err(ValidationError {
                violations: vec![Violation::new("body", "deve ser um objeto JSON")],
            });
        };

        let mut violations = Vec::new();

        for key in object.keys() {
            if !self.rules.iter().any(|r| r.name == key) {
                violations.push(Violation::new(key, "propriedade não permitida"));
            }
        }

        for rule in self.rules {
            match object.get(rule.name) {
                None | Some(Value::Null) => {
                    if rule.required {
                        violations.push(Violation::new(rule.name, "é obrigatório"));
                    }
                }
                Some(Value::String(value)) => {
                    if value.trim().is_empty() {
                        if !rule.allow_empty {
                            violations.push(Violation::new(rule.name, "não deve ser vazio"));
                        }
                    } else if rule.kind == FieldKind::Email && !is_valid_email(value) {
                        violations.push(Violation::new(
                            rule.name,
                            "deve ser um endereço de email válido",
                        ));
                    }
                }
                Some(_) => {
                    violations.push(Violation::new(rule.name, "deve ser uma string"));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.len() > 254 || value.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{is_valid_email, CREATE, UPDATE};

    #[test]
    fn create_accepts_a_complete_payload() {
        let payload = json!({
            "cpf_cnpj": "12345678900",
            "nome": "Teste Cliente",
            "email": "teste@cliente.com",
            "telefone": "11999999999",
            "cep": "01001000",
            "numero": "123",
            "complemento": "Apto 45",
        });

        assert!(CREATE.check(&payload).is_ok());
    }

    #[test]
    fn create_aggregates_all_violations() {
        let payload = json!({
            "cpf_cnpj": "",
            "nome": "",
            "email": "invalido",
            "telefone": 123,
        });

        let error = CREATE.check(&payload).expect_err("should fail");
        let fields: Vec<&str> = error.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["cpf_cnpj", "nome", "email", "telefone"]);
    }

    #[test]
    fn create_requires_mandatory_fields() {
        let error = CREATE.check(&json!({})).expect_err("should fail");
        let fields: Vec<&str> = error.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["cpf_cnpj", "nome", "email"]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let payload = json!({
            "cpf_cnpj": "12345678900",
            "nome": "Teste",
            "email": "teste@cliente.com",
            "segredo": "x",
        });

        let error = CREATE.check(&payload).expect_err("should fail");
        assert_eq!(error.violations.len(), 1);
        assert_eq!(error.violations[0].field, "segredo");
    }

    #[test]
    fn update_allows_any_subset_but_checks_supplied_values() {
        assert!(UPDATE.check(&json!({ "nome": "Novo Nome" })).is_ok());
        assert!(UPDATE.check(&json!({})).is_ok());

        let error = UPDATE.check(&json!({ "email": "sem-arroba" })).expect_err("bad email");
        assert_eq!(error.violations[0].field, "email");

        let error = UPDATE.check(&json!({ "nome": "  " })).expect_err("empty nome");
        assert_eq!(error.violations[0].field, "nome");
    }

    #[test]
    fn non_object_body_is_a_single_violation() {
        let error = CREATE.check(&json!("texto")).expect_err("should fail");
        assert_eq!(error.violations[0].field, "body");
    }

    #[test]
    fn email_syntax_rules() {
        assert!(is_valid_email("teste@cliente.com"));
        assert!(is_valid_email("a.b+c@sub.dominio.br"));
        assert!(!is_valid_email("invalido"));
        assert!(!is_valid_email("@dominio.com"));
        assert!(!is_valid_email("a@semponto"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a b@dominio.com"));
        assert!(!is_valid_email("a@@dominio.com"));
    }
}
