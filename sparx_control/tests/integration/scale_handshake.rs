//! Integration test: Scaling → Drives climb handshake.
//!
//! Scaling arms the winch, Drives waits for both hooks, winches the wanted
//! distance with the drive motors and hands back a single completion token.

use sparx_common::consts::WINCH_IN_DISTANCE;
use sparx_common::error::FaultFlags;
use sparx_common::hal::device::{MotorChannel, Solenoid};
use sparx_common::telemetry::DashboardValue;
use sparx_control::drives::TankPowers;
use sparx_control::drives::winch::WinchState;
use sparx_control::scaling::ScalingState;

use super::{Harness, TICK};

/// Start the climb and let Drives pick up the request.
fn armed() -> Harness {
    let mut h = Harness::new();
    h.robot.scaling.lock().scale();
    h.tick();
    h
}

#[test]
fn full_climb_handshake() {
    let mut h = armed();
    {
        let drives = h.robot.drives.lock();
        assert_eq!(drives.winch_state(), WinchState::Hooks);
        assert_eq!(drives.wanted_winch_distance(), WINCH_IN_DISTANCE);
        assert!(drives.wants_to_scale());
    }
    {
        let scaling = h.robot.scaling.lock();
        assert_eq!(scaling.state(), ScalingState::Scaling);
        assert!(scaling.faults().contains(FaultFlags::HOOKS_MISSING));
    }

    // No winching without hooks.
    h.tick_n(10);
    assert_eq!(h.robot.drives.lock().winch_state(), WinchState::Hooks);
    assert_eq!(h.plant.right_travel(), 0.0);

    h.robot.scaling.lock().clear_faults();
    h.rig.scaling.set_hooks(true);
    h.tick_until(20, |r| r.drives.lock().winch_state() == WinchState::Scaling)
        .expect("winch never started");
    assert!(h.robot.scaling.lock().faults().is_empty());

    h.tick_until(300, |r| r.scaling.lock().state() == ScalingState::Standby)
        .expect("climb never completed");

    {
        let drives = h.robot.drives.lock();
        assert_eq!(drives.winch_state(), WinchState::Standby);
        assert_eq!(drives.output(), TankPowers::ZERO);
        assert!(!drives.wants_to_scale());
        // Scaling already took the token.
        assert!(!drives.is_scale_scaling_done());
    }
    assert_eq!(h.rig.drives.left_front.get(), 0.0);
    assert_eq!(h.rig.drives.right_front.get(), 0.0);

    // The winch pulls the robot backwards by the drive motors.
    let pulled = h.plant.right_travel().abs();
    // Encoder quantization: half a tick either way.
    assert!(pulled > WINCH_IN_DISTANCE - 0.01, "pulled {pulled}");
    assert!(pulled < WINCH_IN_DISTANCE + 1.0, "pulled {pulled}");
    assert!(h.plant.right_travel() < 0.0);

    let scaling = h.robot.scaling.lock();
    assert!(scaling.arms_down());
    assert!(scaling.ratchet_locked());
    assert!(h.rig.scaling.arms.get());
    assert!(h.rig.scaling.ratchet.get());
    assert_eq!(
        h.robot.dashboard.get("Scaling"),
        Some(DashboardValue::Text("Standby".to_string()))
    );
    assert_eq!(h.robot.dashboard.get_bool("Hooks Engaged?"), Some(true));
}

#[test]
fn completion_token_is_one_shot() {
    let mut h = armed();
    h.rig.scaling.set_hooks(true);
    h.tick_until(20, |r| r.drives.lock().winch_state() == WinchState::Scaling)
        .expect("winch never started");

    // Tick Drives alone so nobody else consumes the token.
    for _ in 0..300 {
        h.clock.advance(TICK);
        h.robot.drives.lock().execute();
        h.plant.step(TICK);
        if h.robot.drives.lock().winch_state() == WinchState::Standby {
            break;
        }
    }
    let drives = h.robot.drives.lock();
    assert_eq!(drives.winch_state(), WinchState::Standby);
    assert!(drives.is_scale_scaling_done());
    assert!(!drives.is_scale_scaling_done());
}

#[test]
fn hooks_must_stay_engaged_through_the_settle_time() {
    let mut h = armed();
    h.rig.scaling.set_hooks(true);
    h.tick_n(4);
    assert_eq!(h.robot.drives.lock().winch_state(), WinchState::Hooks);

    // A bounce restarts the settle timer.
    h.rig.scaling.set_hooks(false);
    h.tick_n(2);
    h.rig.scaling.set_hooks(true);
    h.tick_n(7);
    assert_eq!(h.robot.drives.lock().winch_state(), WinchState::Hooks);
    assert_eq!(h.plant.right_travel(), 0.0);

    h.tick_until(5, |r| r.drives.lock().winch_state() == WinchState::Scaling)
        .expect("winch never started");
}

#[test]
fn estop_aborts_the_climb() {
    let mut h = armed();
    h.rig.scaling.set_hooks(true);
    h.tick_until(20, |r| r.drives.lock().winch_state() == WinchState::Scaling)
        .expect("winch never started");
    h.tick_n(3);
    assert!(h.robot.drives.lock().output().left > 0.0);

    h.robot.scaling.lock().estop();
    assert_eq!(h.robot.scaling.lock().state(), ScalingState::Standby);
    h.tick();

    let drives = h.robot.drives.lock();
    assert_eq!(drives.winch_state(), WinchState::Standby);
    assert!(drives.auto_function_done());
    assert!(!drives.wants_to_scale());
    assert_eq!(drives.output(), TankPowers::ZERO);
    assert_eq!(h.rig.drives.right_back.get(), 0.0);
}

#[test]
fn extend_arms_raises_them_for_one_step() {
    let mut h = Harness::new();
    assert!(h.rig.scaling.arms.get());
    assert!(h.rig.scaling.ratchet.get());

    h.robot.scaling.lock().extend_arms();
    h.tick();
    let scaling = h.robot.scaling.lock();
    assert_eq!(scaling.state(), ScalingState::Standby);
    assert!(!scaling.arms_down());
    assert!(!h.rig.scaling.arms.get());
    assert!(h.rig.scaling.ratchet.get());
}

#[test]
fn estop_is_not_lost_to_a_following_scale() {
    let mut h = Harness::new();
    h.robot.drives.lock().drive_wanted_distance(500.0);
    h.tick_n(3);
    assert!(!h.robot.drives.lock().auto_function_done());

    {
        let mut scaling = h.robot.scaling.lock();
        scaling.estop();
        scaling.scale();
    }
    h.tick();

    let drives = h.robot.drives.lock();
    assert!(drives.auto_function_done());
    assert_eq!(drives.output(), TankPowers::ZERO);
    // The climb requested after the e-stop still goes through.
    assert_eq!(drives.winch_state(), WinchState::Hooks);
    assert!(drives.wants_to_scale());
}
