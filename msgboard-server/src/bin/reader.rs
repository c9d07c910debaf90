use std::process::ExitCode;

use msgboard_server::ServiceKind;

fn main() -> ExitCode {
    msgboard_server::run(ServiceKind::Reader)
}
