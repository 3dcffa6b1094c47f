use bloomlink_transport::{select_device, BluezRegistry, DeviceRegistry};

use crate::cmd::DevicesArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_devices, OutputFormat};

pub fn run(args: DevicesArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = BluezRegistry::with_root(&args.store);
    let devices = registry
        .bonded_devices()
        .map_err(|err| transport_error("device enumeration failed", err))?;

    let selected = select_device(&devices, &args.device);
    print_devices(&devices, selected, format);

    Ok(SUCCESS)
}
