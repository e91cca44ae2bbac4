//! CLI that reads a page from stdin, runs every filter once and prints a
//! JSON report (or, with `--html`, the filtered page) to stdout.
//!
//! Usage: `filter_stdin [--url <page url>] [--state <settings.json>] [--block-seller <name>]... [--block-brand <name>]... [--html]`
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::env;
use std::error::Error;
use std::io::{self, Read};
use std::rc::Rc;

use bol_filter::store::{BlockList, JsonFileStorage, BLOCKED_BRANDS_KEY, BLOCKED_SELLERS_KEY};
use bol_filter::{filter_page, BlockKind, MemoryStorage, Options, Page, Storage};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Args {
    url: Option<String>,
    state: Option<String>,
    block: Vec<(BlockKind, String)>,
    html: bool,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut parsed = Args::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => parsed.url = Some(args.next().ok_or("--url needs a value")?),
            "--state" => parsed.state = Some(args.next().ok_or("--state needs a path")?),
            "--block-seller" => {
                let name = args.next().ok_or("--block-seller needs a name")?;
                parsed.block.push((BlockKind::Seller, name));
            }
            "--block-brand" => {
                let name = args.next().ok_or("--block-brand needs a name")?;
                parsed.block.push((BlockKind::Brand, name));
            }
            "--html" => parsed.html = true,
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }
    Ok(parsed)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = parse_args()?;

    let mut html = String::new();
    io::stdin().read_to_string(&mut html)?;

    let page = match &args.url {
        Some(url) => Page::with_url(&html, url)?,
        None => Page::new(&html),
    };
    let page = Rc::new(page);

    let storage: Rc<dyn Storage> = match &args.state {
        Some(path) => Rc::new(JsonFileStorage::new(path)),
        None => Rc::new(MemoryStorage::new()),
    };
    if !args.block.is_empty() {
        let sellers = BlockList::from_persisted(
            storage.get(BLOCKED_SELLERS_KEY)?.as_ref(),
        );
        let brands = BlockList::from_persisted(
            storage.get(BLOCKED_BRANDS_KEY)?.as_ref(),
        );
        for (kind, name) in &args.block {
            match kind {
                BlockKind::Seller => sellers.add(name),
                BlockKind::Brand => brands.add(name),
            };
        }
        storage.set(BLOCKED_SELLERS_KEY, sellers.to_persisted())?;
        storage.set(BLOCKED_BRANDS_KEY, brands.to_persisted())?;
    }

    let report = filter_page(Rc::clone(&page), storage, &Options::default());

    if args.html {
        println!("{}", page.html());
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
