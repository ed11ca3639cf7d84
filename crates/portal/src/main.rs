use anyhow::{Context, anyhow, bail};

use sigma_client::ClientConfig;
use sigma_portal::Portal;

const USAGE: &str = "usage: sigma-portal <command>
  page <path>                              render a page anonymously
  login <email> <password> [path]          sign in, then render a page (default /)
  reset-password <email>                   send a password-reset email
  change-password <email> <current> <new>  sign in, then change the password";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sigma_observability::init();

    let config = ClientConfig::from_env().context("loading configuration")?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let portal = Portal::connect(&config);

    let result = run(&portal, &args).await;
    portal.shutdown().await;
    result
}

async fn run(portal: &Portal, args: &[String]) -> anyhow::Result<()> {
    match args {
        [cmd, path] if cmd == "page" => {
            portal.session().settled().await;
            print_page(portal, path)
        }
        [cmd, email, password, rest @ ..] if cmd == "login" && rest.len() <= 1 => {
            portal
                .sign_in(email, password)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            let path = rest.first().map(String::as_str).unwrap_or("/");
            print_page(portal, path)
        }
        [cmd, email] if cmd == "reset-password" => {
            portal
                .session()
                .reset_password(email)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Email de recuperación enviado");
            Ok(())
        }
        [cmd, email, current, new] if cmd == "change-password" => {
            portal
                .sign_in(email, current)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            portal
                .session()
                .change_password(current, new)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Contraseña cambiada exitosamente");
            Ok(())
        }
        _ => bail!(USAGE),
    }
}

fn print_page(portal: &Portal, path: &str) -> anyhow::Result<()> {
    let view = portal.page(path);
    let json = serde_json::to_string_pretty(&view).context("serializing page view")?;
    println!("{json}");
    Ok(())
}
