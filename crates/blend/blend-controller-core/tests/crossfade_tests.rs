use blend_controller::{
    ActiveBase, BlendController, BlendEvent, ClipInfo, Config, RequestOutcome,
};
use blend_test_fixtures::{clip_sets, configs};

fn controller(config: &str) -> BlendController {
    let cfg: Config = configs::load(config).expect("config fixture");
    let mut ctl = BlendController::new(cfg).expect("valid config");
    let clips: Vec<ClipInfo> = clip_sets::load("xbot").expect("clip fixture");
    ctl.load_clips(&clips).expect("clips load");
    ctl
}

fn weight(ctl: &BlendController, name: &str) -> f32 {
    ctl.action(name).expect("handle").effective_weight
}

fn approx(a: f32, b: f32) {
    assert!((a - b).abs() <= 1e-4, "left={a} right={b}");
}

#[test]
fn crossfade_from_idle_starts_in_the_same_tick() {
    let mut ctl = controller("xbot");
    assert_eq!(weight(&ctl, "idle"), 1.0);

    let out = ctl.request_transition(Some("walk"), 0.35);
    assert_eq!(out, RequestOutcome::Immediate);
    assert_eq!(ctl.current_base(), &ActiveBase::Track("walk".into()));

    ctl.tick(0.175);
    approx(weight(&ctl, "idle"), 0.5);
    approx(weight(&ctl, "walk"), 0.5);

    let out = ctl.tick(0.175);
    let finished: Vec<_> = out
        .events
        .iter()
        .filter(|e| matches!(e, BlendEvent::FadeFinished { .. }))
        .collect();
    assert_eq!(finished.len(), 2);

    assert_eq!(weight(&ctl, "walk"), 1.0);
    assert_eq!(weight(&ctl, "idle"), 0.0);
    assert!(!ctl.action("idle").unwrap().enabled);
    assert!(ctl.action("walk").unwrap().enabled);
}

#[test]
fn crossfade_is_linear_over_its_duration() {
    let mut ctl = controller("xbot");
    ctl.request_transition(Some("run"), 1.0);
    for step in 1..=3 {
        ctl.tick(0.25);
        let t = 0.25 * step as f32;
        approx(weight(&ctl, "run"), t);
        approx(weight(&ctl, "idle"), 1.0 - t);
    }
}

#[test]
fn crossfade_from_a_moving_track_waits_for_its_loop() {
    let mut ctl = controller("walking");
    assert!(ctl.current_base().is("walk"));

    let out = ctl.request_transition(Some("run"), 0.2);
    assert_eq!(out, RequestOutcome::Deferred);
    assert!(ctl.current_base().is("run"));

    for _ in 0..3 {
        ctl.tick(0.25);
        assert_eq!(weight(&ctl, "walk"), 1.0);
        assert_eq!(weight(&ctl, "run"), 0.0);
        assert!(ctl.pending_transition().is_some());
    }

    // walk wraps at 1.0s; the crossfade begins at that boundary
    let out = ctl.tick(0.5);
    assert!(out.events.iter().any(|e| matches!(
        e,
        BlendEvent::TransitionStarted { from: Some(f), to: Some(t), .. } if f == "walk" && t == "run"
    )));
    assert!(ctl.pending_transition().is_none());
    assert_eq!(weight(&ctl, "walk"), 1.0);
    assert_eq!(weight(&ctl, "run"), 0.0);
    assert_eq!(ctl.action("run").unwrap().local_time, 0.0);

    ctl.tick(0.1);
    approx(weight(&ctl, "walk"), 0.5);
    approx(weight(&ctl, "run"), 0.5);

    ctl.tick(0.15);
    assert_eq!(weight(&ctl, "walk"), 0.0);
    assert_eq!(weight(&ctl, "run"), 1.0);
    assert!(!ctl.action("walk").unwrap().enabled);
}

#[test]
fn warped_crossfade_matches_clip_speeds() {
    let mut ctl = controller("walking");
    ctl.request_transition(Some("run"), 0.2);
    ctl.tick(1.0);
    ctl.tick(0.25);

    // walk (1.0s) ends at the pace of run (0.5s); run ends at its native speed
    let walk = ctl.action("walk").unwrap();
    assert!(walk.warp.is_none());
    approx(walk.time_scale, 2.0);
    let run = ctl.action("run").unwrap();
    approx(run.time_scale, 1.0);
}

#[test]
fn fade_to_nothing_disables_the_base_track() {
    let mut ctl = controller("xbot");
    ctl.request_transition(Some("run"), 0.0);
    ctl.tick(0.1);
    assert_eq!(weight(&ctl, "run"), 1.0);

    let out = ctl.request_transition(None, 0.5);
    assert_eq!(out, RequestOutcome::Immediate);
    assert_eq!(ctl.current_base(), &ActiveBase::None);

    ctl.tick(0.25);
    approx(weight(&ctl, "run"), 0.5);
    ctl.tick(0.3);
    assert_eq!(weight(&ctl, "run"), 0.0);
    assert!(!ctl.action("run").unwrap().enabled);

    // nothing -> base fades in without a partner
    assert_eq!(ctl.request_transition(None, 0.5), RequestOutcome::AlreadyActive);
    assert_eq!(ctl.request_transition(Some("walk"), 0.5), RequestOutcome::Immediate);
    ctl.tick(0.25);
    approx(weight(&ctl, "walk"), 0.5);
}

#[test]
fn requesting_the_current_base_is_a_no_op() {
    let mut ctl = controller("xbot");
    ctl.tick(0.1);
    let before = ctl.state().clone();
    assert_eq!(ctl.request_transition(Some("idle"), 0.35), RequestOutcome::AlreadyActive);
    assert_eq!(ctl.state(), &before);
    let out = ctl.tick(0.1);
    assert!(out.events.is_empty());
    assert_eq!(weight(&ctl, "idle"), 1.0);
}

#[test]
fn unknown_and_additive_targets_are_ignored() {
    let mut ctl = controller("xbot");
    assert_eq!(ctl.request_transition(Some("tpose"), 0.35), RequestOutcome::UnknownTrack);
    assert_eq!(ctl.request_transition(Some("agree"), 0.35), RequestOutcome::UnknownTrack);
    assert!(ctl.current_base().is_idle());
    ctl.tick(0.1);
    assert_eq!(weight(&ctl, "idle"), 1.0);
}

#[test]
fn additive_weights_survive_base_transitions() {
    let mut ctl = controller("xbot");
    assert!(ctl.set_additive_weight("agree", 0.6));
    assert!(ctl.set_additive_weight("sad_pose", -3.0));

    ctl.request_transition(Some("walk"), 0.35);
    for _ in 0..4 {
        ctl.tick(0.1);
        approx(weight(&ctl, "agree"), 0.6);
        assert_eq!(weight(&ctl, "sad_pose"), 0.0);
    }
    ctl.request_transition(None, 0.2);
    ctl.tick(0.5);
    approx(weight(&ctl, "agree"), 0.6);
}

#[test]
fn later_request_replaces_a_waiting_one() {
    let mut ctl = controller("walking");
    ctl.request_transition(Some("run"), 0.2);
    assert_eq!(ctl.request_transition(Some("idle"), 0.4), RequestOutcome::PendingReplaced);
    assert!(ctl.current_base().is_idle());

    let out = ctl.tick(1.0);
    assert!(out.events.iter().any(|e| matches!(
        e,
        BlendEvent::TransitionStarted { to: Some(t), duration, .. } if t == "idle" && *duration == 0.4
    )));
    ctl.tick(0.2);
    approx(weight(&ctl, "idle"), 0.5);
    approx(weight(&ctl, "walk"), 0.5);
    assert_eq!(weight(&ctl, "run"), 0.0);
}

#[test]
fn reselecting_the_source_cancels_a_waiting_request() {
    let mut ctl = controller("walking");
    ctl.request_transition(Some("run"), 0.2);
    assert_eq!(ctl.request_transition(Some("walk"), 0.2), RequestOutcome::PendingCancelled);
    assert!(ctl.current_base().is("walk"));
    assert!(ctl.pending_transition().is_none());

    let out = ctl.tick(1.5);
    assert!(out.events.iter().any(|e| matches!(e, BlendEvent::TransitionCancelled { .. })));
    assert!(!out.events.iter().any(|e| matches!(e, BlendEvent::TransitionStarted { .. })));
    assert_eq!(weight(&ctl, "walk"), 1.0);
    assert_eq!(weight(&ctl, "run"), 0.0);
}

#[test]
fn panel_follows_the_current_base() {
    let mut ctl = controller("xbot");
    ctl.request_transition(Some("walk"), 0.35);
    ctl.tick(0.175);
    let panel = ctl.panel_state();
    assert_eq!(panel.current_base, ActiveBase::Track("walk".into()));
    assert!(panel.row("walk").unwrap().active);
    approx(panel.row("walk").unwrap().weight, 0.5);
    approx(panel.row("idle").unwrap().weight, 0.5);
}
