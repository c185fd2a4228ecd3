// ABOUTME: CLI for parsing feeds with the tidings feed parser.
// ABOUTME: Fetches a feed from URL or file/stdin and prints the normalized payload as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use serde_json::{json, Value};
use tidings_feed::FeedParser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Parse one or more RSS/RDF/Atom feeds and output JSON.
#[derive(Parser, Debug)]
#[command(name = "tidings")]
#[command(about = "Parse feeds with tidings and print JSON", long_about = None)]
struct Args {
    /// Feed URL(s) (http/https) or local file paths. Use "-" to read one feed from stdin.
    #[arg(required = true)]
    targets: Vec<String>,

    /// Override the source URL of the feed (only valid when a single target is provided).
    #[arg(long)]
    feed_url: Option<String>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Skip tracking pixels when picking post images from HTML content.
    #[arg(long, default_value_t = false)]
    skip_tracking_images: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.targets.len() > 1 && args.feed_url.is_some() {
        bail!("--feed-url is only valid when parsing a single target");
    }

    let parser = FeedParser::builder()
        .skip_tracking_images(args.skip_tracking_images)
        .build();

    let mut results = Vec::new();

    for target in &args.targets {
        let feed_url = args
            .feed_url
            .clone()
            .unwrap_or_else(|| target.clone());

        let parsed = load_bytes(target)
            .and_then(|bytes| parser.parse(&bytes, &feed_url).map_err(anyhow::Error::new));
        match parsed {
            Ok(feed) => {
                debug!(%feed_url, posts = feed.posts.len(), "parsed feed");
                results.push(json!({
                    "feed_url": feed_url,
                    "ok": true,
                    "feed": feed,
                    "error": null
                }))
            }
            Err(err) => {
                warn!(%feed_url, error = %err, "failed to parse feed");
                results.push(json!({
                    "feed_url": feed_url,
                    "ok": false,
                    "feed": null,
                    "error": err.to_string()
                }))
            }
        }
    }

    let output = render_output(results);

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

/// A single successful target prints the bare feed; anything else prints an
/// envelope with every result and the counts.
fn render_output(mut results: Vec<Value>) -> Value {
    let is_ok = |r: &Value| r.get("ok").and_then(Value::as_bool) == Some(true);

    if results.len() == 1 && is_ok(&results[0]) {
        let mut only = results.swap_remove(0);
        return only["feed"].take();
    }

    let parsed = results.iter().filter(|r| is_ok(r)).count();
    let failed = results.len() - parsed;
    json!({
        "feeds": results,
        "total_feeds": results.len(),
        "parsed": parsed,
        "failed": failed
    })
}

fn load_bytes(target: &str) -> Result<Vec<u8>> {
    if target == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    if target.starts_with("http://") || target.starts_with("https://") {
        let resp = reqwest::blocking::get(target)?.error_for_status()?;
        let bytes = resp.bytes()?;
        return Ok(bytes.to_vec());
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    Ok(fs::read(path)?)
}
