use std::path::PathBuf;
use std::process;

use clap::{App, Arg, ArgMatches};
use colored::*;
use log::error;

use vmbuscheck::api::params::{CommonInitParams, NodeInitParams, SshInitParams};
use vmbuscheck::api::{Node, NodeType, VmGeneration};
use vmbuscheck::check::Checks;
use vmbuscheck::errors::NodeError;
use vmbuscheck::suite::{self, TestResult, LSVMBUS_CHANNEL_COUNTING};
use vmbuscheck::tools::Lsvmbus;

fn parse_args() -> ArgMatches<'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(LSVMBUS_CHANNEL_COUNTING.description)
        .arg(
            Arg::with_name("host")
                .short("H")
                .long("host")
                .takes_value(true)
                .help("check a guest over ssh instead of the local machine"),
        )
        .arg(
            Arg::with_name("user")
                .short("u")
                .long("user")
                .takes_value(true)
                .requires("host")
                .help("ssh user"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .takes_value(true)
                .requires("host")
                .help("ssh port"),
        )
        .arg(
            Arg::with_name("identity")
                .short("i")
                .long("identity")
                .takes_value(true)
                .requires("host")
                .help("ssh private key"),
        )
        .arg(
            Arg::with_name("generation")
                .short("g")
                .long("generation")
                .takes_value(true)
                .possible_values(&["1", "2"])
                .help("VM generation, probed from the guest firmware when omitted"),
        )
        .arg(Arg::with_name("skip_names").long("skip-names").help("do not check device names"))
        .arg(
            Arg::with_name("skip_network")
                .long("skip-network")
                .help("do not check network channel counts"),
        )
        .arg(
            Arg::with_name("skip_scsi")
                .long("skip-scsi")
                .help("do not check SCSI channel counts"),
        )
        .arg(
            Arg::with_name("list")
                .short("l")
                .long("list")
                .help("print the VMBus devices and exit"),
        )
        .get_matches()
}

fn init_params(matches: &ArgMatches) -> Result<NodeInitParams, String> {
    let vm_generation = matches
        .value_of("generation")
        .map(|g| g.parse::<VmGeneration>())
        .transpose()
        .map_err(|e| e.to_string())?;
    let ssh = match matches.value_of("host") {
        Some(host) => Some(SshInitParams {
            host: host.to_string(),
            user: matches.value_of("user").map(String::from),
            port: matches
                .value_of("port")
                .map(|p| p.parse::<u16>())
                .transpose()
                .map_err(|e| format!("invalid port: {}", e))?,
            identity: matches.value_of("identity").map(PathBuf::from),
        }),
        None => None,
    };
    Ok(NodeInitParams {
        common: Some(CommonInitParams { vm_generation }),
        ssh,
    })
}

fn checks(matches: &ArgMatches) -> Checks {
    let mut checks = Checks::all();
    if matches.is_present("skip_names") {
        checks.remove(Checks::NAMES);
    }
    if matches.is_present("skip_network") {
        checks.remove(Checks::NETWORK_CHANNELS);
    }
    if matches.is_present("skip_scsi") {
        checks.remove(Checks::SCSI_CHANNELS);
    }
    checks
}

fn list_devices(node: &dyn Node) -> Result<(), NodeError> {
    for device in Lsvmbus::new(node).get_vmbuses()? {
        println!(
            "VMBUS ID {:>2}: {{{}}} - {}",
            device.vmbus_id, device.class_id, device.vmbus_name
        );
        for (rel_id, cpu) in &device.channel_vp_map {
            println!("\tRel_ID={}, target_cpu={}", rel_id, cpu);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let matches = parse_args();
    let params = match init_params(&matches) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };
    let node_type = if params.ssh.is_some() {
        NodeType::Ssh
    } else {
        NodeType::Local
    };
    let node = match vmbuscheck::init(Some(node_type), Some(params)) {
        Ok(node) => node,
        Err(e) => {
            error!("failed to init {:?} node: {}", node_type, e);
            eprintln!("{}: {}", "ERROR".red(), e);
            process::exit(2);
        }
    };

    if matches.is_present("list") {
        if let Err(e) = list_devices(node.as_ref()) {
            eprintln!("{}: {}", "ERROR".red(), e);
            process::exit(2);
        }
        return;
    }

    print!("Test {} ... ", LSVMBUS_CHANNEL_COUNTING.name);
    let code = match suite::run_with_checks(node.as_ref(), checks(&matches)) {
        Ok(TestResult::Passed) => {
            println!("{}", "PASSED".green());
            0
        }
        Ok(TestResult::Skipped(reason)) => {
            println!("{}: {}", "SKIPPED".yellow(), reason);
            0
        }
        Ok(TestResult::Failed(msg)) => {
            println!("{}: {}", "FAILED".red(), msg);
            1
        }
        Err(e) => {
            println!("{}: {}", "ERROR".red(), e);
            2
        }
    };
    process::exit(code);
}
