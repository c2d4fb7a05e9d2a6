//! Integration test: autonomous defense crossing driven by the tilt gyro.

use sparx_common::consts::{COME_DOWN_SPEED, CROSS_SPEED, REACH_SPEED};
use sparx_control::drives::TankPowers;
use sparx_control::drives::auto::{AutoState, DefState};

use super::Harness;

#[test]
fn crossing_follows_the_tilt_profile() {
    let mut h = Harness::new();
    let tilt = h.rig.drives.tilt_gyro.clone();
    tilt.set_absolute(3.5);
    h.robot.drives.lock().start_auto_def();

    // (tilt, phase after the tick, power commanded by the tick)
    let profile = [
        (0.0, DefState::ReachDef, REACH_SPEED),
        (3.0, DefState::ReachDef, REACH_SPEED),
        (6.0, DefState::CrossDef, REACH_SPEED),
        (8.0, DefState::CrossDef, CROSS_SPEED),
        (4.0, DefState::CrossDef, CROSS_SPEED),
        (-2.0, DefState::CrossDef, CROSS_SPEED),
        (-6.0, DefState::ComeDown, CROSS_SPEED),
        (-3.0, DefState::ComeDown, COME_DOWN_SPEED),
    ];
    for (i, (angle, phase, power)) in profile.into_iter().enumerate() {
        tilt.set_angle(angle);
        h.tick();
        let drives = h.robot.drives.lock();
        assert_eq!(drives.auto_state(), AutoState::Def, "tick {i}");
        assert_eq!(drives.def_state(), phase, "tick {i}");
        assert_eq!(drives.output(), TankPowers::new(power, power), "tick {i}");
    }
    assert!(h.plant.right_travel() > 0.0);

    tilt.set_angle(1.0);
    h.tick();
    let drives = h.robot.drives.lock();
    assert!(drives.auto_function_done());
    assert_eq!(drives.def_state(), DefState::ReachDef);
    assert_eq!(drives.output(), TankPowers::ZERO);
}

#[test]
fn flat_ground_keeps_reaching() {
    let mut h = Harness::new();
    h.robot.drives.lock().start_auto_def();
    h.tick_n(25);
    let drives = h.robot.drives.lock();
    assert_eq!(drives.auto_state(), AutoState::Def);
    assert_eq!(drives.def_state(), DefState::ReachDef);
    assert_eq!(drives.output(), TankPowers::new(REACH_SPEED, REACH_SPEED));
}

#[test]
fn e_stop_mid_crossing() {
    let mut h = Harness::new();
    let tilt = h.rig.drives.tilt_gyro.clone();
    h.robot.drives.lock().start_auto_def();
    tilt.set_angle(7.0);
    h.tick_n(2);
    assert_eq!(h.robot.drives.lock().def_state(), DefState::CrossDef);

    h.robot.drives.lock().auto_e_stop();
    h.tick();
    let drives = h.robot.drives.lock();
    assert!(drives.auto_function_done());
    assert_eq!(drives.output(), TankPowers::ZERO);

    // A new crossing starts from the approach.
    drop(drives);
    h.robot.drives.lock().start_auto_def();
    assert_eq!(h.robot.drives.lock().def_state(), DefState::ReachDef);
}
