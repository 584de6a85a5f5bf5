//! OCPP Inspect - parse OCPP documents and print their canonical form
//!
//! Reads a request document (the JSON object of one action) or a complete
//! OCPP-J frame, runs it through the codec and prints either the canonical
//! re-serialization or the protocol result the codec would answer with.
//!
//! # Usage
//!
//! ```bash
//! # Request document for a known action
//! ocpp-inspect --action BatterySwap --file swap.json
//!
//! # OCPP-J frame from stdin, action taken from the CALL
//! echo '[2,"1","Heartbeat",{}]' | ocpp-inspect --frame
//!
//! # Show the parse trail
//! ocpp-inspect --action BootNotification --file boot.json --log-level debug
//! ```
//!
//! Exit status is 0 when the input parsed, 2 when the codec rejected it.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use ocpp_codec::messages::{
    BatterySwap, BootNotification, ClearCache, DataTransfer, Heartbeat, ACTIONS,
};
use ocpp_codec::rpc::Frame;
use ocpp_codec::types::NetworkingNodeId;
use ocpp_codec::{
    Action, CodecConfig, CodecHooks, JsonCodec, OcppResult, Request, RequestMeta, ResultCode,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// OCPP message inspector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action name (required unless --frame carries a CALL)
    #[arg(short, long)]
    action: Option<String>,

    /// Input file (stdin when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Input is an OCPP-J frame instead of a bare document
    #[arg(long)]
    frame: bool,

    /// Node id of the peer the document is addressed to
    #[arg(long, default_value = "csms")]
    to: String,

    /// Node id of this node
    #[arg(short, long, default_value = "ocpp-inspect")]
    node: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

/// What the codec made of the input
#[derive(Debug, Clone, PartialEq)]
struct Report {
    accepted: bool,
    output: Value,
}

impl Report {
    fn accepted(output: Value) -> Self {
        Self {
            accepted: true,
            output,
        }
    }

    fn rejected(result: &OcppResult) -> Self {
        Self {
            accepted: false,
            output: result.to_json(&CodecHooks::none()),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let input = read_input(&args)?;
    let report = inspect(&args, &input)?;

    let text = if args.compact {
        serde_json::to_string(&report.output)?
    } else {
        serde_json::to_string_pretty(&report.output)?
    };
    println!("{}", text);

    if !report.accepted {
        std::process::exit(2);
    }
    Ok(())
}

fn read_input(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    match &args.file {
        Some(path) => {
            debug!("Reading {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Parse `input` as configured by `args`.
///
/// Codec rejections are a [`Report`], not an error; only usage mistakes
/// (no action, malformed frame) fail.
fn inspect(args: &Args, input: &str) -> Result<Report, Box<dyn std::error::Error>> {
    let config = CodecConfig::new(args.node.as_str());
    let meta = config.request_meta(NetworkingNodeId::from(args.to.as_str()));
    let hooks = CodecHooks::none();

    if !args.frame {
        let action = args.action.as_deref().ok_or("--action is required for a bare document")?;
        let json: Value = match serde_json::from_str(input) {
            Ok(json) => json,
            Err(e) => return Ok(Report::rejected(&OcppResult::formation_violation(e.to_string()))),
        };
        return Ok(inspect_document(action, &json, meta, &hooks));
    }

    let frame = Frame::parse(input.as_bytes())?;
    info!("{:?} frame {}", frame.message_type(), frame.message_id());

    match frame {
        Frame::Call(call) => {
            if let Some(expected) = args.action.as_deref() {
                if expected != call.action {
                    warn!("Frame action {} overrides --action {}", call.action, expected);
                }
            }
            let meta = meta.with_request_id(call.message_id.clone());
            let report = inspect_document(&call.action, &call.payload, meta, &hooks);
            let output = if report.accepted {
                json!([2, call.message_id.as_str(), call.action, report.output])
            } else {
                report.output
            };
            Ok(Report {
                accepted: report.accepted,
                output,
            })
        }
        // A reply can only be typed against the request that caused it;
        // without one the payload is shown as received.
        Frame::CallResult(result) => Ok(Report::accepted(result.payload)),
        Frame::CallError(error) => {
            let code = ResultCode::from(error.error_code);
            let mut result = OcppResult::error(code, error.error_description);
            let details = &error.error_details;
            if !details.is_null() && details.as_object().map_or(true, |d| !d.is_empty()) {
                result = result.with_details(error.error_details);
            }
            Ok(Report::accepted(result.to_json(&hooks)))
        }
    }
}

fn inspect_document(action: &str, json: &Value, meta: RequestMeta, hooks: &CodecHooks) -> Report {
    match action {
        "BatterySwap" => canonical::<BatterySwap>(json, meta, hooks),
        "BootNotification" => canonical::<BootNotification>(json, meta, hooks),
        "ClearCache" => canonical::<ClearCache>(json, meta, hooks),
        "DataTransfer" => canonical::<DataTransfer>(json, meta, hooks),
        "Heartbeat" => canonical::<Heartbeat>(json, meta, hooks),
        other => {
            warn!("Unknown action {}, known: {}", other, ACTIONS.join(", "));
            Report::rejected(&OcppResult::error(
                ResultCode::NotImplemented,
                format!("unknown action '{}'", other),
            ))
        }
    }
}

fn canonical<A: Action>(json: &Value, meta: RequestMeta, hooks: &CodecHooks) -> Report {
    match Request::<A>::try_parse(json, meta, hooks) {
        Ok(request) => {
            debug!("{} {} accepted", A::NAME, request.request_id());
            Report::accepted(request.to_json(hooks))
        }
        Err(e) => {
            info!("{} rejected: {}", A::NAME, e);
            Report::rejected(&OcppResult::from_parse_error(&e))
        }
    }
}
