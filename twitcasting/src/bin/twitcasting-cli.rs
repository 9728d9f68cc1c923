use eyre::Context;
use std::io::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use twitcasting::TwitCastingClient;
use twitcasting::oauth::{AuthorizationCodeFlow, ImplicitFlow};
use twitcasting::twitcasting_api::Lang;

const USAGE: &str = "usage: twitcasting-cli <login | user <id> | live <id> | comments <movie id> | categories>";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["login"] => login().await,
        ["user", id] => {
            let user = client()?
                .get_user_info(id)
                .await
                .context("fetch user")?;
            println!("{} (@{}) level {}", user.name, user.screen_id, user.level);
            println!("  created: {}", user.created);
            println!("  live:    {}", user.is_live);
            if !user.profile.is_empty() {
                println!("  {}", user.profile);
            }
            Ok(())
        }
        ["live", id] => {
            let live = client()?
                .get_current_live(id)
                .await
                .context("fetch current live")?;
            let movie = &live.movie;
            println!("{} by @{}", movie.title, live.broadcaster.screen_id);
            println!("  {}", movie.link);
            println!(
                "  viewers: {} now, {} total",
                movie.current_view_count, movie.total_view_count
            );
            if !live.tags.is_empty() {
                println!("  tags: {}", live.tags.join(", "));
            }
            Ok(())
        }
        ["comments", movie_id] => {
            let client = client()?;
            let mut comments = std::pin::pin!(client.comments_stream(movie_id));
            while let Some(comment) = comments.next().await {
                let comment = comment.context("fetch comment")?;
                println!(
                    "[{}] @{}: {}",
                    comment.created, comment.from_user.screen_id, comment.message
                );
            }
            Ok(())
        }
        ["categories"] => {
            let categories = client()?
                .get_categories(Lang::En)
                .await
                .context("fetch categories")?;
            for category in categories {
                println!("{}", category.name);
                for sub in &category.sub_categories {
                    println!("  {} ({}): {} lives", sub.name, sub.id, sub.count);
                }
            }
            Ok(())
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

fn client() -> eyre::Result<TwitCastingClient> {
    if let Ok(token) = std::env::var("TWITCASTING_ACCESS_TOKEN") {
        return TwitCastingClient::with_token(token).context("build client");
    }
    match (
        std::env::var("TWITCASTING_CLIENT_ID"),
        std::env::var("TWITCASTING_CLIENT_SECRET"),
    ) {
        (Ok(id), Ok(secret)) => {
            TwitCastingClient::with_app_credentials(id, secret).context("build client")
        }
        _ => eyre::bail!(
            "set TWITCASTING_ACCESS_TOKEN, or TWITCASTING_CLIENT_ID and TWITCASTING_CLIENT_SECRET"
        ),
    }
}

/// Implicit grant by default; the Authorization Code grant when a client secret and redirect URI
/// are configured.
async fn login() -> eyre::Result<()> {
    let client_id =
        std::env::var("TWITCASTING_CLIENT_ID").context("TWITCASTING_CLIENT_ID must be set")?;
    let code_flow = match (
        std::env::var("TWITCASTING_CLIENT_SECRET"),
        std::env::var("TWITCASTING_REDIRECT_URI"),
    ) {
        (Ok(secret), Ok(redirect_uri)) => Some(AuthorizationCodeFlow::new(
            client_id.clone(),
            secret,
            redirect_uri,
        )),
        _ => None,
    };
    let implicit_flow = ImplicitFlow::new(client_id);

    let url = match &code_flow {
        Some(flow) => flow.authorize_url(),
        None => implicit_flow.authorize_url(),
    }
    .context("build authorization URL")?;

    tracing::info!(url = %url, "asking user to follow OAuth flow");
    if let Err(e) = webbrowser::open(url.as_ref()) {
        tracing::warn!(error = %e, "could not open browser");
        eprintln!("open this URL to authorize: {url}");
    }
    eprintln!("paste the URL you were redirected to:");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("read redirect URL")?;
    let redirect = line.trim();
    let token = match &code_flow {
        Some(flow) => {
            let code = flow.parse_redirect(redirect).context("parse redirect URL")?;
            flow.exchange_code(&code)
                .await
                .context("exchange authorization code")?
        }
        None => implicit_flow
            .parse_redirect(redirect)
            .context("parse redirect URL")?,
    };

    let me = TwitCastingClient::with_token(token.access_token.clone())
        .context("build client")?
        .verify_credentials()
        .await
        .context("verify new token")?;
    eprintln!("logged in as @{} (app {})", me.user.screen_id, me.app.name);
    if let Some(at) = token.expires_at {
        eprintln!("token expires at {at}");
    }
    println!("{}", token.access_token);
    Ok(())
}
