use std::sync::Arc;

use bloomlink_session::{connect_with_config, CloseReason, SessionEvent};
use tracing::info;

use crate::cmd::WatchArgs;
use crate::exit::{session_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let (session, events) =
        connect_with_config(&args.connect.registry(), &args.connect.to_config())
            .map_err(|err| session_error("connect failed", err))?;
    let session = Arc::new(session);

    install_ctrlc_handler(Arc::clone(&session))?;

    let mut printed = 0usize;

    for event in events.iter() {
        match event {
            SessionEvent::Record(record) => {
                print_record(&record, format);
                printed = printed.saturating_add(1);

                if let Some(count) = args.count {
                    if printed >= count {
                        session.cancel();
                        return Ok(SUCCESS);
                    }
                }
            }
            SessionEvent::Closed(reason) => {
                return match reason {
                    CloseReason::Cancelled => Ok(SUCCESS),
                    CloseReason::EndOfStream => {
                        info!("device closed the connection");
                        Ok(SUCCESS)
                    }
                    CloseReason::ReadFailed(message) => {
                        Err(CliError::new(FAILURE, format!("stream read failed: {message}")))
                    }
                    CloseReason::RecordTooLarge { size, max } => Err(CliError::new(
                        FAILURE,
                        format!("unterminated record too large ({size} bytes, max {max})"),
                    )),
                };
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(session: Arc<bloomlink_session::Session>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        session.cancel();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
