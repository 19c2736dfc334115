use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use clap::{ArgAction, Parser};
use config_request::{
    encode, Arg, Buffer, BufferOptions, ConfigTree, Indent, Marker, Tag, WriteOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "cfgreq",
    version,
    about = "Compose daemon request payloads from tagged arguments"
)]
struct Args {
    /// Tagged arguments: a tag such as `size=%d` followed by its value when the
    /// tag carries a marker (%d, %s, %b). Options must come first.
    #[arg(
        value_name = "TAG [VALUE]",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    tagged: Vec<String>,

    /// Build a config tree and print it as config text instead of flat lines.
    #[arg(long)]
    tree: bool,

    /// Print the built tree as JSON (implies --tree).
    #[arg(long)]
    json: bool,

    /// Add FLAG to the array field FIELD (FIELD=FLAG). Repeatable; implies --tree.
    #[arg(long = "flag", value_name = "FIELD=FLAG")]
    flags: Vec<String>,

    /// Remove FLAG from the array field FIELD (FIELD=FLAG), after all --flag additions.
    #[arg(long = "unflag", value_name = "FIELD=FLAG")]
    unflags: Vec<String>,

    /// Indent tree output with this many spaces instead of a tab.
    #[arg(long, value_name = "number")]
    indent: Option<usize>,

    /// Refuse to grow the output buffer beyond this many bytes.
    #[arg(long, value_name = "bytes")]
    limit: Option<usize>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn tree_mode(&self) -> bool {
        self.tree || self.json || !self.flags.is_empty() || !self.unflags.is_empty()
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(&args) {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let tagged = parse_tagged(&args.tagged)?;
    let buffer_options = BufferOptions::new().with_limit(args.limit);

    let output = if args.tree_mode() {
        render_tree(args, &tagged, &buffer_options)?
    } else {
        let mut buf = Buffer::with_options(&buffer_options);
        buf.append_args(&tagged)?;
        buf.into_string()
    };

    match args.output.as_deref() {
        Some(path) if path != "-" => {
            fs::write(path, output.as_bytes())?;
            println!("✔ Wrote {} bytes → {}", output.len(), display_path(path));
        }
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(output.as_bytes())?;
        }
    }
    Ok(())
}

fn render_tree(
    args: &Args,
    tagged: &[Arg<'_>],
    buffer_options: &BufferOptions,
) -> Result<String, Box<dyn Error>> {
    let mut tree = ConfigTree::new();
    let root = tree.root();
    tree.make_nodes(root, None, tagged)?;

    for spec in &args.flags {
        let (field, flag) = split_flag(spec)?;
        tree.set_flag(root, field, flag, true)?;
    }
    for spec in &args.unflags {
        let (field, flag) = split_flag(spec)?;
        tree.set_flag(root, field, flag, false)?;
    }

    if args.json {
        let mut json = serde_json::to_string_pretty(&tree)?;
        json.push('\n');
        return Ok(json);
    }

    let indent = match args.indent {
        Some(count) => Indent::spaces(count),
        None => Indent::Tab,
    };
    let mut buf = Buffer::with_options(buffer_options);
    encode::write_tree(&tree, &mut buf, &WriteOptions::new().with_indent(indent))?;
    Ok(buf.into_string())
}

/// Pair each tag with the word after it when its marker asks for a value.
fn parse_tagged(words: &[String]) -> Result<Vec<Arg<'_>>, Box<dyn Error>> {
    let mut tagged = Vec::with_capacity(words.len());
    let mut words = words.iter();

    while let Some(tag) = words.next() {
        let marker = if tag.contains("%t") {
            Some(Marker::Tree)
        } else {
            Tag::parse(tag).ok().and_then(|parsed| parsed.embedded_marker())
        };
        let arg = match marker {
            None => Arg::text(tag),
            Some(Marker::Tree) => {
                return Err(
                    format!("tree arguments cannot be given on the command line: '{tag}'").into(),
                );
            }
            Some(marker) => {
                let value = words
                    .next()
                    .ok_or_else(|| format!("missing value for '{tag}'"))?;
                match marker {
                    Marker::Int => {
                        let number = value
                            .parse::<i64>()
                            .map_err(|err| format!("invalid integer '{value}' for '{tag}': {err}"))?;
                        Arg::int(tag, number)
                    }
                    Marker::Str => Arg::str(tag, value),
                    Marker::Block | Marker::Tree => Arg::block(tag, Some(value.as_str())),
                }
            }
        };
        tagged.push(arg);
    }

    Ok(tagged)
}

fn split_flag(spec: &str) -> Result<(&str, &str), Box<dyn Error>> {
    spec.split_once('=')
        .filter(|(field, flag)| !field.is_empty() && !flag.is_empty())
        .ok_or_else(|| format!("expected FIELD=FLAG, got '{spec}'").into())
}

fn display_path(path: &str) -> String {
    let path = Path::new(path);
    match std::env::current_dir() {
        Ok(cwd) => path
            .strip_prefix(&cwd)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
