//! Integration test: autonomous distance drive and turn against the plant.

use sparx_common::consts::AUTO_DRIVE_SLACK;
use sparx_common::hal::device::MotorChannel;
use sparx_control::drives::TankPowers;
use sparx_control::drives::auto::AutoState;
use sparx_control::drives::shift::ShiftState;

use super::Harness;

#[test]
fn drive_100_inches_stops_within_slack() {
    let mut h = Harness::new();
    h.robot.drives.lock().drive_wanted_distance(100.0);
    assert!(!h.robot.drives.lock().auto_function_done());

    h.tick_until(500, |r| r.drives.lock().auto_function_done())
        .expect("auto drive never finished");

    {
        let drives = h.robot.drives.lock();
        let travelled = drives.current_auto_distance();
        assert!(travelled >= 100.0 - AUTO_DRIVE_SLACK, "stopped at {travelled}");
        assert!(travelled <= 100.0, "overshot to {travelled}");
        assert_eq!(drives.auto_state(), AutoState::Standby);
        assert_eq!(drives.output(), TankPowers::ZERO);
    }
    assert_eq!(h.rig.drives.left_front.get(), 0.0);
    assert_eq!(h.rig.drives.right_back.get(), 0.0);

    // Both sides moved forward together.
    assert!((h.plant.left_travel() - h.plant.right_travel()).abs() < 1e-9);
    assert!(h.plant.heading().abs() < 1e-9);

    // The robot stays put afterwards.
    let parked = h.plant.right_travel();
    h.tick_n(10);
    assert_eq!(h.plant.right_travel(), parked);
}

#[test]
fn negative_distance_drives_backwards() {
    let mut h = Harness::new();
    h.robot.drives.lock().drive_wanted_distance(-50.0);

    h.tick();
    // Reverse is positive power at the controller.
    assert!(h.rig.drives.right_front.get() > 0.0);

    h.tick_until(500, |r| r.drives.lock().auto_function_done())
        .expect("auto drive never finished");

    assert!(h.plant.right_travel() < -(50.0 - AUTO_DRIVE_SLACK));
    assert!(h.plant.right_travel() > -50.0);
    let drives = h.robot.drives.lock();
    assert!(drives.right_distance() < 0.0);
    assert!(drives.left_distance() < 0.0);
}

#[test]
fn auto_e_stop_aborts_drive() {
    let mut h = Harness::new();
    h.robot.drives.lock().drive_wanted_distance(200.0);
    h.tick_n(10);
    assert!(h.plant.right_travel() > 0.0);

    h.robot.drives.lock().auto_e_stop();
    h.tick();

    let drives = h.robot.drives.lock();
    assert!(drives.auto_function_done());
    assert_eq!(drives.shift_state(), ShiftState::InLowGear);
    assert_eq!(drives.output(), TankPowers::ZERO);
    assert_eq!(h.rig.drives.left_back.get(), 0.0);
}

#[test]
fn turn_waits_for_settle_then_slows_near_target() {
    let mut h = Harness::new();
    let gyro = h.rig.drives.heading_gyro.clone();
    gyro.set_absolute(12.0);

    h.robot.drives.lock().turn(45.0);
    h.tick_open_loop();
    assert_eq!(h.robot.drives.lock().output(), TankPowers::ZERO);

    h.clock.advance(0.25);
    h.tick_open_loop();
    assert_eq!(h.rig.drives.left_front.get(), -0.75);
    assert_eq!(h.rig.drives.right_front.get(), 0.75);

    gyro.set_angle(40.0);
    h.tick_open_loop();
    assert_eq!(h.robot.drives.lock().output(), TankPowers::new(-0.25, 0.25));

    gyro.set_angle(47.0);
    h.tick_open_loop();
    assert_eq!(h.robot.drives.lock().output(), TankPowers::new(0.25, -0.25));

    gyro.set_angle(45.05);
    h.tick_open_loop();
    let drives = h.robot.drives.lock();
    assert!(drives.auto_function_done());
    assert_eq!(drives.output(), TankPowers::ZERO);
}

#[test]
fn closed_loop_turn_moves_the_heading() {
    let mut h = Harness::new();
    h.robot.drives.lock().turn(90.0);
    // Settle delay.
    h.tick_n(12);
    assert!(h.plant.heading().abs() < 1e-9);

    h.tick_n(5);
    assert!(h.plant.heading() > 10.0, "heading {}", h.plant.heading());
    assert!(!h.robot.drives.lock().auto_function_done());

    h.robot.drives.lock().kill_auto_drive();
    h.tick();
    let heading = h.plant.heading();
    h.tick_n(5);
    assert_eq!(h.plant.heading(), heading);
}
