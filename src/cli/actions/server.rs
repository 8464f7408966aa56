use crate::cli::actions::Action;
use crate::konto::new;
use anyhow::Result;
use url::Url;

/// Handle the server action
/// # Errors
/// Returns an error if the DSN is not a valid URL or the server fails.
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            gateway_url,
        } => {
            // Fail fast on an unparseable DSN before touching the pool
            let dsn = Url::parse(&dsn)?;

            new(port, dsn.as_str(), &gateway_url).await?;
        }
    }

    Ok(())
}
