//! Purpose: Hold top-level CLI command dispatch for `campuslore`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Feed results print a completion envelope before any error is returned.
//! Invariants: Skipped elements are reported as stderr notices, never on stdout.

use super::*;
use campuslore::api::{
    Batch, CampusClient, Completion, Coordinate, Feed, MemoryUpload, Record, TILE_SIZE, decode,
    distance_meters, parse_timestamp,
};
use campuslore::notice::skipped_element_notice;
use clap::CommandFactory;
use render::completion_json;
use serde_json::json;
use std::io::Read;
use std::path::Path;

pub(super) fn dispatch_command(command: Command, settings: &Settings) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "campuslore", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(settings.color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Content { geofence } => {
            let feed = Feed::historical(geofence.as_str());
            let result = client(settings, settings.config.clone())?.request_content(&geofence);
            emit_feed("content", &feed, result, settings)
        }
        Command::Memories { lat, lng, radius } => {
            let mut config = settings.config.clone();
            if let Some(radius) = radius {
                config = config.with_memory_radius(radius);
            }
            let result = client(settings, config)?.request_memories(Coordinate::new(lat, lng));
            emit_feed("memories", &Feed::Memories, result, settings)
        }
        Command::Geofences {
            lat,
            lng,
            radius,
            containing,
        } => {
            let mut config = settings.config.clone();
            if let Some(radius) = radius {
                config = config.with_geofence_radius(radius);
            }
            let location = Coordinate::new(lat, lng);
            let result = client(settings, config)?
                .request_nearby_geofences(location)
                .and_then(|batch| {
                    if containing {
                        retain_containing(batch, location)
                    } else {
                        Ok(batch)
                    }
                });
            emit_feed("geofences", &Feed::Geofences, result, settings)
        }
        Command::Upload {
            title,
            desc,
            uploader,
            lat,
            lng,
            image,
            taken,
        } => {
            let image_jpeg = std::fs::read(&image).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to read image file: {}", image.display()))
                    .with_source(err)
            })?;
            let taken = match taken {
                Some(text) => parse_timestamp(&text)?.assume_utc(),
                None => time::OffsetDateTime::now_utc(),
            };
            let memory = MemoryUpload::new(
                title,
                desc,
                taken,
                uploader,
                Coordinate::new(lat, lng),
                image_jpeg,
            )?;
            let result = client(settings, settings.config.clone())?.upload_memory(&memory);
            emit_json(
                json!({
                    "success": result.is_ok(),
                    "title": memory.title,
                    "timestamp": memory.timestamp,
                }),
                settings.color_mode,
            );
            result.map(|()| RunOutcome::ok())
        }
        Command::Decode {
            feed,
            geofence,
            input,
        } => {
            let feed = match feed {
                FeedCli::Historical => Feed::historical(geofence.unwrap_or_default()),
                FeedCli::Memories => Feed::Memories,
                FeedCli::Geofences => Feed::Geofences,
            };
            let text = read_input(input.as_deref())?;
            let result = match serde_json::from_str::<Value>(&text) {
                Ok(value) => decode(Some(&value), &feed, settings.policy),
                Err(err) => Err(Error::new(ErrorKind::Transport)
                    .with_message("input is not valid json")
                    .with_hint("Pass the raw response body exactly as the backend returned it.")
                    .with_feed(feed.name())
                    .with_source(err)),
            };
            emit_feed("decode", &feed, result, settings)
        }
        Command::Distance {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
        } => {
            let from = Coordinate::new(from_lat, from_lng);
            let to = Coordinate::new(to_lat, to_lng);
            emit_json(
                json!({
                    "from": from,
                    "to": to,
                    "meters": distance_meters(from, to),
                }),
                settings.color_mode,
            );
            Ok(RunOutcome::ok())
        }
        Command::TileUrl { layer, x, y, zoom } => {
            let layers = match layer {
                Some(layer) => vec![TileLayer::from(layer)],
                None => TileLayer::all().to_vec(),
            };
            let tiles = layers
                .into_iter()
                .map(|layer| {
                    json!({
                        "layer": layer.as_str(),
                        "z_index": layer.z_index(),
                        "tile_size": TILE_SIZE,
                        "url": layer.url(x, y, zoom),
                    })
                })
                .collect::<Vec<_>>();
            emit_json(json!({ "tiles": tiles }), settings.color_mode);
            Ok(RunOutcome::ok())
        }
    }
}

fn client(settings: &Settings, config: ClientConfig) -> Result<CampusClient, Error> {
    Ok(CampusClient::new(config)?.with_error_policy(settings.policy))
}

fn emit_feed(
    cmd: &str,
    feed: &Feed,
    result: Result<Batch, Error>,
    settings: &Settings,
) -> Result<RunOutcome, Error> {
    let completion = Completion::from(&result);
    let skipped = match &result {
        Ok(batch) => {
            if !batch.skipped.is_empty() {
                let time = notice_time_now().unwrap_or_default();
                for issue in &batch.skipped {
                    let notice = skipped_element_notice(cmd, feed.name(), &time, issue);
                    emit_notice(&notice, settings.color_mode);
                }
            }
            batch.skipped.len()
        }
        Err(_) => 0,
    };
    emit_json(
        completion_json(feed.name(), &completion, skipped),
        settings.color_mode,
    );
    result.map(|_| RunOutcome::ok())
}

/// Keep only fences whose circle covers `location`; none left is `EmptyResult`.
fn retain_containing(mut batch: Batch, location: Coordinate) -> Result<Batch, Error> {
    batch
        .records
        .retain(|record| matches!(record, Record::Geofence(fence) if fence.contains(location)));
    if batch.is_empty() {
        return Err(Error::new(ErrorKind::EmptyResult)
            .with_message("no geofence contains the location")
            .with_feed(Feed::Geofences.name()));
    }
    Ok(batch)
}

fn read_input(input: Option<&Path>) -> Result<String, Error> {
    let mut text = String::new();
    match input {
        None => read_stdin(&mut text)?,
        Some(path) if path == Path::new("-") => read_stdin(&mut text)?,
        Some(path) => {
            text = std::fs::read_to_string(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to read input file: {}", path.display()))
                    .with_source(err)
            })?;
        }
    }
    Ok(text)
}

fn read_stdin(text: &mut String) -> Result<(), Error> {
    io::stdin().read_to_string(text).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)
    })?;
    Ok(())
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("campuslore {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "campuslore",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::retain_containing;
    use campuslore::api::{Batch, Coordinate, ErrorKind, Geofence, Record};

    fn fence(name: &str, radius: i64, lat: f64) -> Record {
        Record::Geofence(Geofence {
            name: name.to_string(),
            radius,
            center: Coordinate::new(lat, -93.155),
        })
    }

    #[test]
    fn retain_containing_filters_by_radius() {
        let batch = Batch {
            records: vec![fence("near", 100, 44.4610), fence("far", 100, 44.4700)],
            skipped: Vec::new(),
        };
        let kept = retain_containing(batch, Coordinate::new(44.4612, -93.155)).expect("kept");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.to_generic()[0]["name"], "near");
    }

    #[test]
    fn retain_containing_with_no_match_is_empty_result() {
        let batch = Batch {
            records: vec![fence("far", 100, 44.4700)],
            skipped: Vec::new(),
        };
        let err = retain_containing(batch, Coordinate::new(44.4612, -93.155)).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
        assert_eq!(err.feed(), Some("geofences"));
    }
}
