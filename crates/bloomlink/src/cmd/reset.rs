use bloomlink_proto::Command;
use bloomlink_session::connect_with_config;
use tracing::info;

use crate::cmd::ResetArgs;
use crate::exit::{session_error, CliResult, SUCCESS};

pub fn run(args: ResetArgs) -> CliResult<i32> {
    let (session, _events) =
        connect_with_config(&args.connect.registry(), &args.connect.to_config())
            .map_err(|err| session_error("connect failed", err))?;

    session.send(&Command::Reset);
    info!("reset command sent");

    session.cancel();
    Ok(SUCCESS)
}
