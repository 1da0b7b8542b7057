use subcue::{
    parse_timestamp, resolve, CaptionError, Config, CueEdit, EditSession, FetchError,
    JsonFileRepository, LibraryCommand, PlaybackBridge, Player, PublishError, SimulatedPlayer,
    Timestamp, VideoId, VideoLibrary,
};

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser as ClapParser, Subcommand};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    match run().await {
        Ok(()) => (),
        Err(err) => {
            eprintln!("{}: {}", headline(&err), err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

/// Timestamp, publish and load failures get their own wording so they are
/// never mistaken for one another. Causes are visited outermost first, so a
/// bad timestamp inside stored data is reported as a load failure.
fn headline(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if cause.downcast_ref::<FetchError>().is_some() {
            return "Loading stored data failed";
        }
        if let Some(CaptionError::MalformedTimestamp(_)) = cause.downcast_ref::<CaptionError>() {
            return "Invalid timestamp";
        }
        if cause.downcast_ref::<PublishError>().is_some() {
            return "Publishing failed (local changes were kept)";
        }
    }
    "An error occurred"
}

#[derive(ClapParser)]
#[command(about = "Author and preview time-coded video captions")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "DIR",
        env = "SUBCUE_STORE",
        help = "Directory holding videos.json and the subtitles/ folder.",
        default_value = "."
    )]
    store: PathBuf,
    #[arg(
        long,
        value_name = "URL",
        env = "SUBCUE_MEDIA_URL",
        help = "Prefix used to build each video's playable URL.",
        default_value = "/public/videos"
    )]
    media_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "List the videos in the catalogue")]
    Videos,
    #[command(about = "Print the caption active at the given times")]
    Show {
        video: String,
        #[arg(long = "at", value_name = "SECONDS", required = true)]
        at: Vec<f64>,
    },
    #[command(about = "Add a cue and publish the list")]
    Add {
        video: String,
        #[arg(long, value_name = "HH:MM:SS,mmm")]
        start: String,
        #[arg(long, value_name = "HH:MM:SS,mmm")]
        end: String,
        #[arg(long)]
        text: String,
    },
    #[command(about = "Change fields of an existing cue and publish the list")]
    Edit {
        video: String,
        index: usize,
        #[arg(long, value_name = "HH:MM:SS,mmm")]
        start: Option<String>,
        #[arg(long, value_name = "HH:MM:SS,mmm")]
        end: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
    #[command(about = "Play the captions against a simulated clock")]
    Play {
        video: String,
        #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
        from: f64,
        #[arg(long, value_name = "SECONDS")]
        to: Option<f64>,
        #[arg(long, value_name = "SECONDS", default_value_t = 0.25)]
        step: f64,
    },
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config {
        store_dir: cli.store,
        media_base_url: cli.media_url,
        ..Config::default()
    };
    let repository = JsonFileRepository::new(&config.store_dir);

    match cli.command {
        Command::Videos => list_videos(&config, &repository).await,
        Command::Show { video, at } => {
            let session = open_session(&video, repository).await?;
            for secs in at {
                let now = clock(secs)?;
                match resolve(session.store().snapshot(), now) {
                    Some(cue) => println!("{}  {}", now, cue.text()),
                    None => println!("{}  (none)", now),
                }
            }
            Ok(())
        }
        Command::Add {
            video,
            start,
            end,
            text,
        } => {
            let mut session = open_session(&video, repository).await?;
            let draft = session.stage_new();
            draft.start = start;
            draft.end = end;
            draft.text = text;
            session
                .commit_staged()
                .context("The cue was not added; correct it and try again")?;
            let count = session.store().len();
            session
                .publish()
                .await
                .context(format!("Failed to publish cues for video '{}'", video))?;
            println!("Published {} cues for video '{}'.", count, video);
            Ok(())
        }
        Command::Edit {
            video,
            index,
            start,
            end,
            text,
        } => {
            let mut session = open_session(&video, repository).await?;
            let mut edits = Vec::new();
            if let Some(start) = start {
                edits.push(CueEdit::Start(parse_timestamp(&start)?));
            }
            if let Some(end) = end {
                edits.push(CueEdit::End(parse_timestamp(&end)?));
            }
            if let Some(text) = text {
                edits.push(CueEdit::Text(text));
            }
            if edits.is_empty() {
                return Err(anyhow!("Nothing to change: pass --start, --end or --text."));
            }
            for edit in edits {
                session.update(index, edit)?;
            }
            let count = session.store().len();
            session
                .publish()
                .await
                .context(format!("Failed to publish cues for video '{}'", video))?;
            println!("Published {} cues for video '{}'.", count, video);
            Ok(())
        }
        Command::Play {
            video,
            from,
            to,
            step,
        } => {
            if step.is_nan() || step <= 0.0 {
                return Err(anyhow!("--step must be greater than zero."));
            }
            let session = open_session(&video, repository).await?;
            let store = session.store();
            let to = to.unwrap_or_else(|| {
                store
                    .snapshot()
                    .iter()
                    .map(|cue| cue.end().as_secs_f64())
                    .fold(from, f64::max)
                    + 1.0
            });

            let (mut bridge, mut updates) =
                PlaybackBridge::new(SimulatedPlayer::new(), config.track.clone());
            bridge.on_ready(store);
            bridge.player_mut().seek(from);
            bridge.player_mut().play();

            while bridge.player().current_time() < to {
                let listeners = bridge.player_mut().advance(step);
                for listener in listeners {
                    bridge.on_time_update(listener, store);
                }
                let now = clock(bridge.player().current_time())?;
                while let Ok(update) = updates.try_recv() {
                    if update.text.is_empty() {
                        println!("{}  (none)", now);
                    } else {
                        println!("{}  {}", now, update.text);
                    }
                }
            }
            bridge.detach();
            Ok(())
        }
    }
}

async fn open_session(
    video: &str,
    repository: JsonFileRepository,
) -> Result<EditSession<JsonFileRepository>> {
    let mut session = EditSession::new(VideoId::new(video), repository);
    session
        .hydrate()
        .await
        .context(format!("Failed to load cues for video '{}'", video))?;
    Ok(session)
}

async fn list_videos(config: &Config, repository: &JsonFileRepository) -> Result<()> {
    let library = VideoLibrary::new(config.media_base_url.clone());
    library.dispatch(LibraryCommand::Loading);
    let videos = repository.fetch_videos().await.context(format!(
        "Failed to read the catalogue in '{}'",
        repository.root().display()
    ))?;
    library.dispatch(LibraryCommand::SetVideos(videos));

    let state = library.snapshot();
    if state.videos.is_empty() {
        println!("No videos.");
    }
    for video in state.videos {
        println!(
            "{}  {}  {}",
            video.id,
            video.title,
            video.url.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn clock(secs: f64) -> Result<Timestamp> {
    Timestamp::from_secs_f64(secs)
        .ok_or_else(|| anyhow!("'{}' is not a valid playback time.", secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_stored_cue_is_not_reported_as_user_input() {
        let err = anyhow::Error::new(FetchError::Malformed {
            index: 2,
            source: CaptionError::MalformedTimestamp("00:00:05".into()),
        })
        .context("Failed to load cues for video 'clip'");

        assert_eq!(headline(&err), "Loading stored data failed");
    }

    #[test]
    fn typed_timestamp_is_reported_as_invalid() {
        let err = anyhow::Error::new(CaptionError::MalformedTimestamp("1:00".into()))
            .context("The cue was not added; correct it and try again");

        assert_eq!(headline(&err), "Invalid timestamp");
    }

    #[test]
    fn publish_failure_has_its_own_headline() {
        let err = anyhow::Error::new(PublishError::Rejected("offline".into()))
            .context("Failed to publish cues for video 'clip'");

        assert_eq!(headline(&err), "Publishing failed (local changes were kept)");
    }
}
