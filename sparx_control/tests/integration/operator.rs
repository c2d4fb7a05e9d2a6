//! Integration test: operator pads through Controls into the subsystems.

use sparx_common::consts::{ACQUIRE_ANGLE, MAX_ANGLE};
use sparx_common::error::FaultFlags;
use sparx_common::hal::device::MotorChannel;
use sparx_common::hal::types::Pov;
use sparx_control::ball_acq::{ArmState, FlipperState, RollerState};
use sparx_hal::sim::MatchMode;

use super::Harness;

const XBOX_A: usize = 1;
const XBOX_B: usize = 2;
const XBOX_X: usize = 3;
const XBOX_Y: usize = 4;
const XBOX_R2: usize = 3;
const XBOX_RIGHT_Y: usize = 5;
const DRIVER_Y: usize = 1;

#[test]
fn driver_sticks_drive_the_robot() {
    let mut h = Harness::new();
    h.rig.controls.driver_left.set_axis(DRIVER_Y, -0.5);
    h.rig.controls.driver_right.set_axis(DRIVER_Y, -0.5);

    h.tick_n(50);

    // Half power in low gear for one second.
    assert!((h.plant.left_travel() - 35.0).abs() < 1e-6);
    assert!((h.plant.right_travel() - 35.0).abs() < 1e-6);
    assert!(h.plant.heading().abs() < 1e-9);
    assert!(h.rig.drives.left_front.is_inverted());
    assert_eq!(h.rig.drives.left_front.applied(), 0.5);
}

#[test]
fn pov_acts_on_change_only() {
    let mut h = Harness::new();
    let pad = h.rig.controls.operator.clone();

    pad.set_pov(Pov::Right);
    h.tick();
    {
        let acq = h.robot.ball_acq.lock();
        assert_eq!(acq.arm_state(), ArmState::Rotate);
        assert_eq!(acq.wanted_arm_angle(), ACQUIRE_ANGLE);
        assert_eq!(acq.roller_state(), RollerState::RollerOn);
    }

    pad.set_button(XBOX_Y, true);
    h.tick();
    pad.set_button(XBOX_Y, false);
    // Still holding the hat: no new acquire.
    h.tick_n(3);
    {
        let acq = h.robot.ball_acq.lock();
        assert_eq!(acq.arm_state(), ArmState::Standby);
        assert_eq!(acq.roller_state(), RollerState::Standby);
    }
    assert_eq!(h.rig.ball_acq.roller_right.get(), 0.0);

    pad.set_pov(Pov::Down);
    h.tick();
    let acq = h.robot.ball_acq.lock();
    assert_eq!(acq.wanted_arm_angle(), MAX_ANGLE);
    assert_eq!(acq.flipper_state(), FlipperState::HoldUp);
}

#[test]
fn pov_left_and_up_home_the_arm() {
    let mut h = Harness::new();
    let pad = h.rig.controls.operator.clone();
    h.robot.ball_acq.lock().acquire_ball();

    pad.set_pov(Pov::Left);
    h.tick();
    {
        let acq = h.robot.ball_acq.lock();
        assert_eq!(acq.arm_state(), ArmState::RotateFindingHome);
        assert_eq!(acq.roller_state(), RollerState::Standby);
    }

    pad.set_pov(Pov::Up);
    h.tick();
    let acq = h.robot.ball_acq.lock();
    assert_eq!(acq.arm_state(), ArmState::RotateFindingHome);
    assert_eq!(acq.roller_state(), RollerState::RollerOn);
}

#[test]
fn buttons_are_edge_triggered() {
    let mut h = Harness::new();
    let pad = h.rig.controls.operator.clone();

    pad.set_button(XBOX_A, true);
    h.tick_n(5);
    assert_eq!(
        h.robot.ball_acq.lock().roller_state(),
        RollerState::RollerOn
    );
    pad.set_button(XBOX_A, false);
    h.tick();
    pad.set_button(XBOX_A, true);
    h.tick();
    assert_eq!(
        h.robot.ball_acq.lock().roller_state(),
        RollerState::Standby
    );

    pad.set_button(XBOX_B, true);
    h.tick_n(4);
    assert!(h.robot.ball_acq.lock().is_reversed());
}

#[test]
fn held_trigger_never_rejects_a_fire() {
    let mut h = Harness::new();
    h.rig.controls.operator.set_axis(XBOX_R2, 1.0);

    h.tick();
    assert!(h.robot.ball_acq.lock().is_firing());

    let mut pulses = 0;
    let mut was_firing = true;
    for _ in 0..60 {
        h.tick();
        let firing = h.robot.ball_acq.lock().is_firing();
        if firing && !was_firing {
            pulses += 1;
        }
        was_firing = firing;
    }
    assert!(pulses >= 3, "only {pulses} repeat pulses");
    assert!(
        !h.robot
            .ball_acq
            .lock()
            .faults()
            .contains(FaultFlags::FIRE_REJECTED)
    );
}

#[test]
fn right_stick_takes_over_the_arm() {
    let mut h = Harness::new();
    let pad = h.rig.controls.operator.clone();

    pad.set_axis(XBOX_RIGHT_Y, 0.6);
    h.tick();
    assert_eq!(h.robot.ball_acq.lock().arm_state(), ArmState::OpControl);
    assert!((h.rig.ball_acq.arm_left.get() + 0.2).abs() < 1e-12);
    assert!((h.rig.ball_acq.arm_right.get() - 0.2).abs() < 1e-12);

    pad.set_axis(XBOX_RIGHT_Y, 0.0);
    h.tick();
    assert_eq!(h.robot.ball_acq.lock().arm_state(), ArmState::Standby);
    assert_eq!(h.rig.ball_acq.arm_left.get(), 0.0);
}

#[test]
fn drawbridge_homes_then_drops_to_low_bar() {
    let mut h = Harness::new();
    let pad = h.rig.controls.operator.clone();
    h.robot.ball_acq.lock().acquire_ball();

    pad.set_button(XBOX_X, true);
    h.tick();
    pad.set_button(XBOX_X, false);
    assert!(h.robot.controls.lock().drawbridge_pending());
    assert_eq!(
        h.robot.ball_acq.lock().arm_state(),
        ArmState::RotateFindingHome
    );

    let n = h
        .tick_until(40, |r| !r.controls.lock().drawbridge_pending())
        .expect("low bar follow-up never fired");
    assert!((24..=26).contains(&n), "follow-up after {n} ticks");

    let acq = h.robot.ball_acq.lock();
    assert_eq!(acq.arm_state(), ArmState::Rotate);
    assert_eq!(acq.wanted_arm_angle(), MAX_ANGLE);
    assert_eq!(acq.flipper_state(), FlipperState::HoldUp);
}

#[test]
fn controls_idle_outside_operator_control() {
    let mut h = Harness::new();
    h.rig.controls.station.set_mode(MatchMode::Autonomous);
    h.rig.controls.operator.set_button(XBOX_A, true);
    h.rig.controls.driver_left.set_axis(DRIVER_Y, -1.0);
    h.rig.controls.driver_right.set_axis(DRIVER_Y, -1.0);

    h.tick_n(5);
    assert_eq!(
        h.robot.ball_acq.lock().roller_state(),
        RollerState::Standby
    );
    assert_eq!(h.plant.right_travel(), 0.0);

    // Autonomous intents still run.
    h.robot.drives.lock().drive_wanted_distance(24.0);
    h.tick();
    assert!(h.rig.drives.right_front.get() < 0.0);

    h.rig.controls.station.set_enabled(false);
    h.rig.controls.station.set_mode(MatchMode::OperatorControl);
    h.tick();
    assert_eq!(
        h.robot.ball_acq.lock().roller_state(),
        RollerState::Standby
    );
}
