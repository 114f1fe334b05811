//! OpenAPI description of the HTTP surface, served at `/api/openapi.json`.
//!
//! Request body schemas are derived from the same `PayloadSchema` rules the
//! routes validate against, so the document cannot drift from the enforced
//! contract.

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};

use clientes_core::validation::{FieldKind, PayloadSchema};

pub fn router() -> Router {
    Router::new().route("/api/openapi.json", get(openapi))
}

async fn openapi() -> Json<Value> {
    Json(document())
}

pub fn document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "API Clientes",
            "description": "API para gerenciamento de clientes",
            "version": "1.0",
        },
        "paths": {
            "/clientes": {
                "post": {
                    "summary": "Cadastra um cliente",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": schema_object(&clientes_core::validation::CREATE),
                            },
                        },
                    },
                    "responses": {
                        "201": cliente_response("Cliente cadastrado"),
                        "400": error_response("Dados inválidos ou cadastro duplicado"),
                    },
                },
                "get": {
                    "summary": "Lista todos os clientes",
                    "responses": {
                        "200": {
                            "description": "Lista de clientes",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Cliente" },
                                    },
                                },
                            },
                        },
                    },
                },
            },
            "/clientes/{id}": {
                "parameters": [id_parameter()],
                "get": {
                    "summary": "Busca um cliente pelo id",
                    "responses": {
                        "200": cliente_response("Cliente encontrado"),
                        "404": error_response("Cliente não encontrado"),
                    },
                },
                "patch": {
                    "summary": "Atualiza parcialmente um cliente",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": schema_object(&clientes_core::validation::UPDATE),
                            },
                        },
                    },
                    "responses": {
                        "200": cliente_response("Cliente atualizado"),
                        "400": error_response("Dados inválidos ou cadastro duplicado"),
                        "404": error_response("Cliente não encontrado"),
                    },
                },
                "delete": {
                    "summary": "Remove um cliente",
                    "responses": {
                        "200": cliente_response("Cliente removido"),
                        "404": error_response("Cliente não encontrado"),
                    },
                },
            },
        },
        "components": {
            "schemas": {
                "Cliente": cliente_schema(),
                "Erro": {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string" },
                        "violations": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "field": { "type": "string" },
                                    "message": { "type": "string" },
                                },
                            },
                        },
                    },
                },
            },
        },
    })
}

fn schema_object(schema: &PayloadSchema) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for rule in schema.rules {
        let mut property = Map::new();
        property.insert("type".to_string(), json!("string"));
        if rule.kind == FieldKind::Email {
            property.insert("format".to_string(), json!("email"));
        }
        properties.insert(rule.name.to_string(), Value::Object(property));

        if rule.required {
            required.push(json!(rule.name));
        }
    }

    let mut object = Map::new();
    object.insert("type".to_string(), json!("object"));
    object.insert("additionalProperties".to_string(), json!(false));
    object.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        object.insert("required".to_string(), Value::Array(required));
    }
    Value::Object(object)
}

fn cliente_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "format": "uuid" },
            "cpf_cnpj": { "type": "string" },
            "nome": { "type": "string" },
            "email": { "type": "string", "format": "email" },
            "telefone": { "type": "string", "nullable": true },
            "cep": { "type": "string", "nullable": true },
            "numero": { "type": "string", "nullable": true },
            "complemento": { "type": "string", "nullable": true },
            "created_at": { "type": "string", "format": "date-time" },
        },
    })
}

fn cliente_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Cliente" },
            },
        },
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Erro" },
            },
        },
    })
}

fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" },
    })
}

#[cfg(test)]
mod tests {
    use super::document;

    #[test]
    fn document_describes_every_route() {
        let doc = document();

        assert_eq!(doc["info"]["title"], "API Clientes");
        assert_eq!(doc["info"]["version"], "1.0");

        let paths = doc["paths"].as_object().expect("paths object");
        assert!(paths.contains_key("/clientes"));
        assert!(paths.contains_key("/clientes/{id}"));

        for method in ["post", "get"] {
            assert!(doc["paths"]["/clientes"][method].is_object(), "missing {method}");
        }
        for method in ["get", "patch", "delete"] {
            assert!(doc["paths"]["/clientes/{id}"][method].is_object(), "missing {method}");
        }
    }

    #[test]
    fn create_schema_mirrors_the_validation_rules() {
        let doc = document();
        let schema = &doc["paths"]["/clientes"]["post"]["requestBody"]["content"]
            ["application/json"]["schema"];

        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["required"],
            serde_json::json!(["cpf_cnpj", "nome", "email"])
        );
        assert_eq!(schema["properties"]["email"]["format"], "email");
        assert_eq!(schema["properties"]["telefone"]["type"], "string");
    }

    #[test]
    fn update_schema_has_no_required_fields() {
        let doc = document();
        let schema = &doc["paths"]["/clientes/{id}"]["patch"]["requestBody"]["content"]
            ["application/json"]["schema"];

        assert!(schema["required"].is_null());
        assert_eq!(schema["properties"]["cpf_cnpj"]["type"], "string");
    }
}
