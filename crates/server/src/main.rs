use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    clientes_server::run().await
}
