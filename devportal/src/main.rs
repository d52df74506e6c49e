use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use devportal::{dto, ApiError, ApiResponse, PortalClient};
use devportal_reqwest::Dispatcher;
use devportal_tokens::{sources::SessionStorageFile, ClientId, IdentityProvider, Realm};
use url::Url;

/// Obtain, revoke, and inspect your developer portal API key
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// Base URL of the portal backend API
    #[arg(long, env = "DEVPORTAL_BACKEND_URL")]
    backend_url: Url,

    /// Base URL of the identity provider
    #[arg(long, env = "DEVPORTAL_KEYCLOAK_URL")]
    keycloak_url: Url,

    /// The identity provider realm the portal is registered in
    #[arg(long, env = "DEVPORTAL_KEYCLOAK_REALM")]
    realm: Realm,

    /// The portal's client ID on the identity provider
    #[arg(long, env = "DEVPORTAL_KEYCLOAK_CLIENT_ID")]
    client_id: ClientId,

    /// The session storage file the identity library writes signed-in users to
    #[arg(
        long,
        env = "DEVPORTAL_SESSION_FILE",
        value_name = "FILE",
        default_value = ".session.json"
    )]
    session_file: PathBuf,

    /// Where the identity provider sends the user after signing in
    #[arg(
        long,
        env = "DEVPORTAL_REDIRECT_URI",
        default_value = "http://localhost:5173/"
    )]
    redirect_uri: Url,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Get your API key, issuing one if you do not have one yet
    GetKey,
    /// Delete your API key
    DeleteKey,
    /// Show the routes that accept API keys
    Routes,
    /// Print the URL to sign in at
    LoginUrl,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let provider = IdentityProvider::new(opts.keycloak_url, opts.realm, opts.client_id);
    let login_url = provider
        .authorization_url(&opts.redirect_uri)
        .wrap_err("unable to build the login URL")?;

    let credentials = SessionStorageFile::new(opts.session_file, provider.session_key());
    let client = PortalClient::new(Dispatcher::new(opts.backend_url, credentials));

    let result = match opts.command {
        Command::LoginUrl => {
            println!("{login_url}");
            return Ok(());
        }
        Command::GetKey => client.get_api_key().await.and_then(|resp| {
            report(resp, |key: dto::ApiKey| {
                println!("API key: {}", key.api_key);
                print_routes(&key.routes);
            })
        }),
        Command::DeleteKey => client.delete_api_key().await.and_then(|resp| {
            report(resp, |_: dto::Message| {
                println!("API key deleted successfully");
            })
        }),
        Command::Routes => client.list_routes().await.and_then(|resp| {
            report(resp, |routes: dto::Routes| print_routes(&routes.routes))
        }),
    };

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(message)) => Err(eyre!(message)),
        Err(error) if error.requires_login() => {
            tracing::debug!(%error, "sign in required");
            Err(eyre!("you are not signed in; sign in at {login_url}"))
        }
        Err(error) => Err(error).wrap_err("unable to communicate with the API server"),
    }
}

/// Prints a successful response, or hands back the message to show for a failed one
fn report<T, F>(resp: ApiResponse, on_success: F) -> Result<Result<(), String>, ApiError>
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(T),
{
    if resp.is_error {
        let message = resp.message().unwrap_or("Undefined error message");
        return Ok(Err(message.to_owned()));
    }

    on_success(resp.decode()?);
    Ok(Ok(()))
}

fn print_routes(routes: &[String]) {
    if routes.is_empty() {
        return;
    }

    println!("Routes:");
    for route in routes {
        println!("  {route}");
    }
}
