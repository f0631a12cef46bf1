//! Stand-in navigation service for bench testing.
//!
//! Accepts goals on a REP socket and reports each one as succeeded after a fixed travel time.
//!
//! Usage: `fake_nav_server [ENDPOINT] [TRAVEL_TIME_S]`

use comms_if::eqpt::nav::{NavGoal, NavGoalStatus, NavResult};
use comms_if::net::{zmq, MonitoredSocket, SocketOptions};
use std::{env, thread, time::Duration};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let endpoint = args.get(1).map(String::as_str).unwrap_or("tcp://*:5030");
    let travel_time_s: f64 = match args.get(2) {
        Some(s) => s.parse()?,
        None => 2.0,
    };

    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        bind: true,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&ctx, zmq::REP, socket_options, endpoint)?;

    println!(
        "Fake navigation service running on {}, travel time {:.1} s",
        endpoint, travel_time_s
    );

    loop {
        let msg = socket.recv_msg(0)?;

        let goal: NavGoal = match msg.as_str().map(serde_json::from_str) {
            Some(Ok(g)) => g,
            // A REP socket must reply before receiving again, so invalid goals get an empty reply
            Some(Err(e)) => {
                println!("Could not parse goal: {}", e);
                socket.send("", 0)?;
                continue;
            }
            None => {
                println!("Received non UTF-8 goal");
                socket.send("", 0)?;
                continue;
            }
        };

        println!(
            "Goal {} to {:?} in \"{}\"",
            goal.goal_id, goal.position_m, goal.frame_id
        );

        thread::sleep(Duration::from_secs_f64(travel_time_s));

        let result = NavResult {
            goal_id: goal.goal_id,
            status: NavGoalStatus::Succeeded,
        };
        socket.send(&serde_json::to_string(&result)?, 0)?;

        println!("Goal {} succeeded", goal.goal_id);
    }
}
