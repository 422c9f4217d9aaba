use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use reqwest::Url;
use sotd_api::{
    client::ApiClient,
    profile_page::{Load, ProfileLoader},
    recap::{RecapTab, RecapView},
    select_sotd::SelectSotd,
};

#[derive(Parser)]
#[command(name = "sotdcli")]
#[command(about = "song of the day command line client", long_about = None)]
struct Cli {
    /// Base URL of the sotd-api gateway
    #[arg(long, env = "SOTD_BASE_URL", default_value = "http://localhost:3000")]
    base_url: Url,

    /// Session cookie to authenticate with, as sent by the browser
    #[arg(long, env = "SOTD_COOKIE")]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a profile with its recap and today's pick
    Profile {
        #[arg(value_name = "USER_ID")]
        user_id: String,

        /// Day to show the pick for, defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Show the latest weekly recap
    Recap {
        #[arg(value_name = "USER_ID")]
        user_id: String,

        /// artists, albums or tracks
        #[arg(short, long, default_value_t = RecapTab::Artists)]
        tab: RecapTab,
    },

    /// List every song of the day, newest first
    History {
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },

    /// Search Spotify for tracks
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// List recommended tracks to pick from
    Recommended {
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },

    /// Pick one of the recommended tracks as today's song
    Pick {
        #[arg(value_name = "USER_ID")]
        user_id: String,

        #[arg(value_name = "TRACK_ID")]
        track_id: String,

        #[arg(short, long, default_value = "")]
        note: String,

        #[arg(short, long, default_value = "")]
        mood: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("sotdcli=info,sotd_api=info")
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.base_url, cli.cookie);

    match cli.command {
        Commands::Profile { user_id, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            handle_profile(&client, &user_id, date).await
        }
        Commands::Recap { user_id, tab } => handle_recap(&client, &user_id, tab).await,
        Commands::History { user_id } => handle_history(&client, &user_id).await,
        Commands::Search { query } => handle_search(&client, &query).await,
        Commands::Recommended { user_id } => handle_recommended(&client, &user_id).await,
        Commands::Pick {
            user_id,
            track_id,
            note,
            mood,
        } => handle_pick(&client, &user_id, &track_id, note, mood).await,
    }
}

async fn handle_profile(client: &ApiClient, user_id: &str, date: NaiveDate) -> Result<()> {
    let page = ProfileLoader::new(client)
        .load_observed(user_id, date, |page| {
            tracing::debug!(
                "profile {}: profile={} recap={} today={}",
                page.user_id,
                page.profile.is_settled(),
                page.recap.is_settled(),
                page.today.is_settled()
            );
        })
        .await;

    match &page.profile {
        Load::Ready(profile) => {
            println!("{}", if profile.name.is_empty() { user_id } else { profile.name.as_str() });
            println!("  photo: {}", profile.photo_url());
            if let Some(bio) = &profile.bio {
                println!("  {}", bio);
            }
            if !profile.top_genres.is_empty() {
                println!("  top genres: {}", profile.top_genres.join(", "));
            }
            if !profile.top_artists.is_empty() {
                println!("  top artists: {}", profile.top_artists.join(", "));
            }
        }
        Load::Missing => println!("no profile for {}", user_id),
        Load::Failed(e) => println!("profile unavailable: {}", e),
        Load::Loading => {}
    }

    println!("\nsong of the day ({}):", date);
    match &page.today {
        Load::Ready(entry) => {
            match &entry.track {
                Some(track) => println!(
                    "  {} by {} ({})",
                    track.name,
                    track.artist_line(),
                    track.album.name
                ),
                None => println!("  track {}", entry.track_id),
            }
            if !entry.note.is_empty() {
                println!("  \"{}\"", entry.note);
            }
            if !entry.mood.is_empty() {
                println!("  mood: {}", entry.mood);
            }
        }
        Load::Missing => println!("  nothing picked yet, try `sotdcli recommended {}`", user_id),
        Load::Failed(e) => println!("  could not load today's pick: {}", e),
        Load::Loading => {}
    }

    println!();
    match &page.recap {
        Load::Ready(recap) => print_recap(recap),
        Load::Missing => println!("no recap yet"),
        Load::Failed(e) => println!("recap unavailable: {}", e),
        Load::Loading => {}
    }

    Ok(())
}

fn print_recap(recap: &RecapView) {
    println!("recap: {}", recap.vibe);
    println!(
        "  {} tracks, {} minutes, {} artists",
        recap.total_tracks, recap.total_duration, recap.unique_artists
    );
    println!("  top {}:", recap.tab);
    for (i, item) in recap.items().iter().enumerate() {
        println!("    {}. {}", i + 1, item);
    }
}

async fn handle_recap(client: &ApiClient, user_id: &str, tab: RecapTab) -> Result<()> {
    let weeks = client
        .weekly_statistics(user_id)
        .await
        .context("Failed to fetch weekly statistics")?;

    match RecapView::from_weeks(&weeks) {
        Some(mut recap) => {
            recap.select(tab);
            print_recap(&recap);
        }
        None => println!("no recap yet"),
    }

    Ok(())
}

async fn handle_history(client: &ApiClient, user_id: &str) -> Result<()> {
    let history = client.sotds(user_id).await.context("Failed to fetch SOTDs")?;

    if history.is_empty() {
        println!("no songs of the day yet");
        return Ok(());
    }

    for (date, picks) in history.newest_first() {
        for pick in picks {
            let title = pick
                .track
                .as_ref()
                .map(|t| format!("{} by {}", t.name, t.artist_line()))
                .unwrap_or_else(|| pick.track_id.clone());
            println!("{}  {}", date, title);
        }
    }

    Ok(())
}

async fn handle_search(client: &ApiClient, query: &str) -> Result<()> {
    let tracks = client.search(query).await.context("Failed to search Spotify")?;

    for track in &tracks {
        println!("{}  {} by {} ({})", track.id, track.name, track.artist, track.album);
    }
    tracing::info!("{} results for {:?}", tracks.len(), query);

    Ok(())
}

async fn handle_recommended(client: &ApiClient, user_id: &str) -> Result<()> {
    let mut flow = SelectSotd::new(user_id);
    flow.load(client).await;

    if let Load::Failed(e) = &flow.tracks {
        anyhow::bail!("{}", e);
    }
    if flow.recommendations().is_empty() {
        println!("No recommended songs available at the moment.");
    }
    for track in flow.recommendations() {
        println!(
            "{}  {} by {} ({})",
            track.id,
            track.name,
            track.primary_artist().unwrap_or("unknown artist"),
            track.album.name
        );
    }

    Ok(())
}

async fn handle_pick(
    client: &ApiClient,
    user_id: &str,
    track_id: &str,
    note: String,
    mood: String,
) -> Result<()> {
    let mut flow = SelectSotd::new(user_id);
    flow.load(client).await;

    if let Load::Failed(e) = &flow.tracks {
        anyhow::bail!("{}", e);
    }

    let track = flow.select(track_id)?;
    println!("picked {} by {}", track.name, track.artist_line());

    flow.set_note(note);
    flow.set_mood(mood);

    let next = flow.submit(client).await?;
    println!("saved, see {}", next);

    Ok(())
}
