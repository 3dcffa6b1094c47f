use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bloomlink_proto::Command;
use bloomlink_session::connect_with_config;
use tracing::info;

use crate::cmd::SetTimeArgs;
use crate::exit::{session_error, CliResult, SUCCESS};

pub fn run(args: SetTimeArgs) -> CliResult<i32> {
    let time = match args.at {
        Some(seconds) => UNIX_EPOCH + Duration::from_secs(seconds),
        None => SystemTime::now(),
    };

    let (session, _events) =
        connect_with_config(&args.connect.registry(), &args.connect.to_config())
            .map_err(|err| session_error("connect failed", err))?;

    session.send(&Command::SetTime(time));
    info!("set-time command sent");

    session.cancel();
    Ok(SUCCESS)
}
