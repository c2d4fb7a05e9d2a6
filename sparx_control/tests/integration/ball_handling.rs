//! Integration test: arm homing, positioning, rollers and the fire pulse.

use sparx_common::consts::{ACQUIRE_ANGLE, DEADBAND, HIGH_ARM_POWER, WAIT_FIRE_TIME};
use sparx_common::error::FaultFlags;
use sparx_common::hal::device::{Encoder, MotorChannel, Solenoid};
use sparx_common::telemetry::DashboardValue;
use sparx_control::ball_acq::{ArmState, FlipperState, RollerState};

use super::{Harness, TICK};

// ── Homing ──────────────────────────────────────────────────────────

#[test]
fn home_switch_trip_stops_arm_and_zeroes_encoders() {
    let mut h = Harness::new();
    let dev = h.rig.ball_acq.clone();
    dev.arm_encoder_left.set_count(-30);
    dev.arm_encoder_right.set_count(30);
    h.robot.ball_acq.lock().toggle_roller();

    for _ in 0..5 {
        h.tick_open_loop();
        assert_eq!(dev.arm_left.get(), HIGH_ARM_POWER);
        assert_eq!(dev.arm_right.get(), -HIGH_ARM_POWER);
        assert_eq!(
            h.robot.ball_acq.lock().arm_state(),
            ArmState::RotateFindingHome
        );
    }

    // Magnet present: raw line low.
    dev.home_switch.set(false);
    h.tick_open_loop();

    assert_eq!(dev.arm_left.get(), 0.0);
    assert_eq!(dev.arm_right.get(), 0.0);
    assert_eq!(dev.arm_encoder_left.resets(), 1);
    assert_eq!(dev.arm_encoder_right.resets(), 1);
    assert_eq!(dev.arm_encoder_left.raw(), 0);
    assert_eq!(dev.arm_encoder_right.raw(), 0);

    let acq = h.robot.ball_acq.lock();
    assert_eq!(acq.arm_state(), ArmState::Standby);
    assert_eq!(acq.roller_state(), RollerState::Standby);
    assert_eq!(acq.left_arm_angle(), 0.0);
    assert_eq!(acq.right_arm_angle(), 0.0);
}

#[test]
fn closed_loop_home_then_acquire() {
    let mut h = Harness::new();

    // 20° above home at 20°/s.
    let homed = h
        .tick_until(200, |r| r.ball_acq.lock().arm_state() == ArmState::Standby)
        .expect("arm never found home");
    assert!((45..=60).contains(&homed), "homed after {homed} ticks");
    assert!(h.plant.arm_angle() <= 0.0);
    {
        let acq = h.robot.ball_acq.lock();
        assert_eq!(acq.left_arm_angle(), 0.0);
        assert_eq!(acq.right_arm_angle(), 0.0);
    }

    h.robot.ball_acq.lock().acquire_ball();
    h.tick();
    assert_eq!(h.rig.ball_acq.roller_right.get(), 1.0);
    assert_eq!(h.rig.ball_acq.roller_left.get(), -1.0);

    h.tick_until(600, |r| r.ball_acq.lock().arm_state() == ArmState::Standby)
        .expect("arm never reached the acquire angle");

    let acq = h.robot.ball_acq.lock();
    assert!((acq.left_arm_angle() - ACQUIRE_ANGLE).abs() < DEADBAND);
    assert!((acq.right_arm_angle() - ACQUIRE_ANGLE).abs() < DEADBAND);
    assert_eq!(acq.roller_state(), RollerState::RollerOn);
    assert_eq!(acq.peak_roller_current(), 30.0);
    assert_eq!(h.rig.ball_acq.arm_left.get(), 0.0);
    assert_eq!(
        h.robot.dashboard.get("Arm"),
        Some(DashboardValue::Text("Standby".to_string()))
    );
}

#[test]
fn stop_all_during_rotation_zeroes_outputs_next_tick() {
    let mut h = Harness::new();
    h.robot.ball_acq.lock().reverse_roller();
    h.robot.ball_acq.lock().acquire_ball();
    h.tick();
    assert_ne!(h.rig.ball_acq.arm_left.get(), 0.0);
    // Acquire clears the reverse flag.
    assert_eq!(h.rig.ball_acq.roller_right.get(), 1.0);

    h.robot.ball_acq.lock().reverse_roller();
    h.tick();
    assert_eq!(h.rig.ball_acq.roller_right.get(), -1.0);

    h.robot.ball_acq.lock().stop_all();
    h.tick();
    let dev = &h.rig.ball_acq;
    assert_eq!(dev.arm_left.get(), 0.0);
    assert_eq!(dev.arm_right.get(), 0.0);
    assert_eq!(dev.roller_left.get(), 0.0);
    assert_eq!(dev.roller_right.get(), 0.0);
    assert!(!dev.flipper.get());
}

// ── Flipper ─────────────────────────────────────────────────────────

#[test]
fn fire_pulse_timing() {
    let mut h = Harness::new();
    let flipper = h.rig.ball_acq.flipper.clone();

    h.clock.set(10.000);
    assert!(h.robot.ball_acq.lock().fire());

    h.clock.set(10.010);
    h.robot.tick();
    assert!(flipper.get());
    assert!(h.robot.ball_acq.lock().is_firing());

    h.clock.set(10.100);
    assert!(!h.robot.ball_acq.lock().fire());
    assert!(
        h.robot
            .ball_acq
            .lock()
            .faults()
            .contains(FaultFlags::FIRE_REJECTED)
    );

    h.clock.set(10.260);
    h.robot.tick();
    assert!(!flipper.get());
    let acq = h.robot.ball_acq.lock();
    assert!(!acq.is_firing());
    assert_eq!(acq.flipper_state(), FlipperState::Standby);
}

#[test]
fn flipper_extended_for_the_whole_pulse() {
    let mut h = Harness::new();
    h.tick();
    h.robot.ball_acq.lock().fire();

    let mut extended = 0;
    while h.robot.ball_acq.lock().flipper_state() == FlipperState::Firing {
        h.tick();
        if h.rig.ball_acq.flipper.get() {
            extended += 1;
        }
        assert!(extended < 100, "fire pulse never ended");
    }

    assert_eq!(extended, 13);
    assert!(extended as f64 * TICK >= WAIT_FIRE_TIME);
    assert!(!h.rig.ball_acq.flipper.get());
    assert!(!h.robot.ball_acq.lock().is_firing());
}

#[test]
fn fire_again_after_pulse_is_accepted() {
    let mut h = Harness::new();
    h.robot.ball_acq.lock().fire();
    h.tick_n(20);
    assert_eq!(
        h.robot.ball_acq.lock().flipper_state(),
        FlipperState::Standby
    );
    assert!(h.robot.ball_acq.lock().fire());
    assert!(h.robot.ball_acq.lock().faults().is_empty());
}
