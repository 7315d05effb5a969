// Integration tests for the tracker's player-facing surface
mod common;

use common::{inline_ad, urls, RecordingSender, RecordingSink};
use vast_tracker::{
    Ad, Creative, CreativeKind, Macro, MacroMap, Notification, Quartile, TrackOptions,
    TrackerConfig, TrackerError, TrackingEvent, UrlTemplate, VastTracker,
};

type Tracker<'a> = VastTracker<'a, RecordingSender, RecordingSink>;

fn tracker(ad: &Ad) -> Tracker<'_> {
    VastTracker::new(
        ad,
        &ad.creatives[0],
        RecordingSender::default(),
        RecordingSink::default(),
    )
}

fn expected_macros() -> MacroMap {
    MacroMap::new()
        .with(Macro::AssetUri, "http%3A%2F%2Fexample.com%2Flinear-asset.mp4")
        .with(Macro::PodSequence, "1")
        .with(Macro::AdServingId, "z292x16y-3d7f-6440-bd29-2ec0f153fc89")
        .with(Macro::AdType, "video")
}

fn declared(ad: &Ad, event: &str) -> Vec<UrlTemplate> {
    ad.creatives[0].tracking_events[event].clone()
}

#[test]
fn test_click_notifies_clickthrough_with_encoded_playhead() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    tracker.set_progress(60.0 * 75.0 + 5.25, &MacroMap::new());

    tracker.click(None, &expected_macros());

    let clickthrough = tracker
        .sink()
        .notifications
        .iter()
        .find(|(name, _)| name == "clickthrough")
        .map(|(_, payload)| payload.clone());
    assert_eq!(
        clickthrough,
        Some(Notification::ClickThrough {
            url: "http://example.com/linear-clickthrough_adplayhead:01%3A15%3A05.250".to_string()
        })
    );

    let last = tracker.sender().calls.last().unwrap();
    assert_eq!(last.templates, ad.creatives[0].video_click_tracking_url_templates);
    assert_eq!(
        last.macros,
        expected_macros().with(Macro::AdPlayhead, "01:15:05.250")
    );
}

#[test]
fn test_click_prefers_explicit_url() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.click(Some("http://example.com/custom"), &MacroMap::new());

    assert_eq!(
        tracker.sink().notifications,
        vec![(
            "clickthrough".to_string(),
            Notification::ClickThrough {
                url: "http://example.com/custom_adplayhead:00%3A00%3A00.000".to_string()
            }
        )]
    );
    assert_eq!(
        tracker.sender().calls[0].macros.get(&Macro::AdPlayhead),
        Some("00:00:00.000")
    );
}

#[test]
fn test_click_without_target_still_fires_click_tracking() {
    let mut ad = inline_ad();
    ad.creatives[0].video_click_through_url_template = None;
    let mut tracker = tracker(&ad);

    tracker.click(None, &MacroMap::new());

    assert_eq!(tracker.sink().count("clickthrough"), 0);
    assert_eq!(tracker.sender().calls.len(), 1);
}

#[test]
fn test_minimize_notifies_and_tracks() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.minimize(&expected_macros());

    assert_eq!(
        tracker.sink().notifications,
        vec![(
            "minimize".to_string(),
            Notification::tracking_urls(&declared(&ad, "minimize"))
        )]
    );
    assert_eq!(tracker.sender().calls.len(), 1);
    assert_eq!(tracker.sender().calls[0].templates, declared(&ad, "minimize"));
    assert_eq!(tracker.sender().calls[0].macros, expected_macros());
}

#[test]
fn test_interaction_events_share_one_contract() {
    let ad = inline_ad();
    let cases: [(TrackingEvent, fn(&mut Tracker<'_>, &MacroMap)); 4] = [
        (TrackingEvent::OtherAdInteraction, |t, m| t.other_ad_interaction(m)),
        (TrackingEvent::AcceptInvitation, |t, m| t.accept_invitation(m)),
        (TrackingEvent::AdExpand, |t, m| t.ad_expand(m)),
        (TrackingEvent::AdCollapse, |t, m| t.ad_collapse(m)),
    ];

    for (event, call) in cases {
        let mut by_method = tracker(&ad);
        call(&mut by_method, &expected_macros());

        let mut by_dispatch = tracker(&ad);
        by_dispatch.fire_event(event, &expected_macros());

        let expected = vec![(
            event.as_str().to_string(),
            Notification::tracking_urls(&declared(&ad, event.as_str())),
        )];
        assert_eq!(by_method.sink().notifications, expected);
        assert_eq!(by_dispatch.sink().notifications, expected);
        assert_eq!(by_method.sender().calls, by_dispatch.sender().calls);
        assert_eq!(by_method.sender().calls[0].macros, expected_macros());
    }
}

#[test]
fn test_undeclared_event_is_silent() {
    let ad = Ad {
        creatives: vec![Creative::default()],
        ..Ad::default()
    };
    let mut tracker = tracker(&ad);

    tracker.minimize(&expected_macros());
    tracker.ad_expand(&expected_macros());
    tracker.fire_event(TrackingEvent::OverlayViewDuration, &expected_macros());

    assert!(tracker.sink().notifications.is_empty());
    assert!(tracker.sender().calls.is_empty());
}

#[test]
fn test_overlay_view_duration_overrides_playhead() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    let overlay_macros = expected_macros()
        .with(Macro::AdPlayhead, "00:00:40")
        .with(Macro::ContentPlayhead, "00:00:40")
        .with(Macro::MediaPlayhead, "00:00:40");

    tracker.overlay_view_duration(30.0, &overlay_macros);

    assert_eq!(
        tracker.sink().notifications,
        vec![(
            "overlayViewDuration".to_string(),
            Notification::tracking_urls(&declared(&ad, "overlayViewDuration"))
        )]
    );
    assert_eq!(
        tracker.sender().calls[0].macros,
        overlay_macros.with(Macro::AdPlayhead, "00:00:30.000")
    );
}

#[test]
fn test_not_used_silences_later_events() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.not_used(&expected_macros());
    tracker.ad_collapse(&expected_macros());

    assert_eq!(tracker.sink().names(), vec!["notUsed"]);
    assert_eq!(tracker.sender().calls.len(), 1);
    assert_eq!(tracker.sender().calls[0].templates, declared(&ad, "notUsed"));
}

#[test]
fn test_verification_not_executed() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    let reason = MacroMap::new().with(Macro::Reason, "3");

    tracker
        .verification_not_executed("company.com-omid", &reason)
        .unwrap();

    let templates =
        ad.ad_verifications[0].tracking_events["verificationNotExecuted"].clone();
    assert_eq!(
        tracker.sink().notifications,
        vec![(
            "verificationNotExecuted".to_string(),
            Notification::tracking_urls(&templates)
        )]
    );
    assert_eq!(tracker.sender().calls[0].templates, templates);
    assert_eq!(tracker.sender().calls[0].macros.get(&Macro::Reason), Some("3"));
}

#[test]
fn test_verification_vendor_not_found() {
    let mut ad = inline_ad();
    ad.ad_verifications[0].vendor = None;
    let mut tracker = tracker(&ad);

    let err = tracker
        .verification_not_executed("company.com-omid", &MacroMap::new())
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "No associated verification element found for vendor: company.com-omid"
    );
    assert!(err.is_configuration_error());
    assert!(tracker.sink().notifications.is_empty());
    assert!(tracker.sender().calls.is_empty());
}

#[test]
fn test_verification_requires_verifications() {
    let mut ad = inline_ad();
    ad.ad_verifications.clear();
    let mut tracker = tracker(&ad);

    let err = tracker
        .verification_not_executed("company.com-omid", &MacroMap::new())
        .unwrap_err();

    assert_eq!(err, TrackerError::NoAdVerifications);
    assert_eq!(err.to_string(), "No adVerifications provided");
}

#[test]
fn test_verification_requires_vendor() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    assert_eq!(
        tracker.verification_not_executed("", &MacroMap::new()),
        Err(TrackerError::NoVendorProvided)
    );
    assert_eq!(
        tracker.verification_not_executed("other.com-omid", &MacroMap::new()),
        Err(TrackerError::VerificationVendorNotFound("other.com-omid".to_string()))
    );
}

#[test]
fn test_set_duration() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_duration(123.0);

    assert_eq!(tracker.asset_duration(), 123.0);
}

#[test]
fn test_set_progress_fires_offset_and_percentage() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    tracker.set_duration(10.0);

    tracker.set_progress(5.0, &MacroMap::new());

    let names = tracker.sink().names();
    assert!(names.contains(&"progress-5"));
    assert!(names.contains(&"progress-50%"));
    assert_eq!(tracker.last_percentage(), 50);
}

#[test]
fn test_set_progress_backfills_missing_percentages() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    tracker.set_duration(10.0);
    tracker.set_last_percentage(1);

    tracker.set_progress(5.0, &MacroMap::new());

    assert_eq!(
        tracker.sink().names(),
        vec!["progress-5", "progress-2%", "progress-3%", "progress-4%", "progress-50%"]
    );
}

#[test]
fn test_offset_events_fire_once() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_progress(5.0, &MacroMap::new());
    tracker.set_progress(6.0, &MacroMap::new());
    tracker.set_progress(9.0, &MacroMap::new());

    assert_eq!(tracker.sink().count("progress-5"), 1);
}

#[test]
fn test_rewind_is_tracked() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_progress(6.0, &MacroMap::new());
    tracker.set_progress(2.0, &MacroMap::new());

    assert_eq!(tracker.sink().count("rewind"), 1);
    assert_eq!(tracker.last_percentage(), 20);
    assert_eq!(tracker.progress(), 2.0);
}

#[test]
fn test_progress_macros_carry_playhead() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    tracker.set_progress(5.25, &MacroMap::new());

    tracker.minimize(&MacroMap::new().with(Macro::AdPlayhead, "caller"));

    let last = tracker.sender().calls.last().unwrap();
    assert_eq!(last.macros.get(&Macro::AdPlayhead), Some("00:00:05.250"));
}

#[test]
fn test_is_quartile_reached() {
    let ad = inline_ad();
    let tracker = tracker(&ad);

    assert!(tracker.is_quartile_reached(Quartile::Midpoint, 20.0, 30.0));
    assert!(!tracker.is_quartile_reached(Quartile::ThirdQuartile, 25.0, 10.0));
}

#[test]
fn test_is_quartile_reached_ignores_duration() {
    let ad = inline_ad();
    for duration in [90.123, 0.0] {
        let creative = Creative {
            duration,
            ..ad.creatives[0].clone()
        };
        let tracker = VastTracker::new(&ad, &creative, RecordingSender::default(), RecordingSink::default());

        assert!(tracker.is_quartile_reached(Quartile::Midpoint, 20.0, 30.0));
        assert!(!tracker.is_quartile_reached(Quartile::Midpoint, 45.0615, 30.0));
    }
}

#[test]
fn test_is_quartile_reached_after_firing() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    tracker.set_progress(16.0, &MacroMap::new());
    tracker.track_quartiles(&MacroMap::new());

    assert!(!tracker.is_quartile_reached(Quartile::Midpoint, 15.0, 16.0));
    assert!(tracker.is_quartile_reached(Quartile::ThirdQuartile, 22.5, 23.0));
}

#[test]
fn test_track_quartiles_fires_each_once() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    tracker.set_progress(16.0, &MacroMap::new());

    let fired = tracker.track_quartiles(&MacroMap::new());
    assert_eq!(
        fired,
        vec![Quartile::Start, Quartile::FirstQuartile, Quartile::Midpoint]
    );
    assert!(tracker.track_quartiles(&MacroMap::new()).is_empty());

    for name in ["start", "firstQuartile", "midpoint"] {
        assert_eq!(tracker.sink().count(name), 1);
    }
    assert_eq!(tracker.sink().count("thirdQuartile"), 0);
}

#[test]
fn test_complete_is_not_repeated_by_quartiles() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_progress(30.0, &MacroMap::new());
    tracker.complete(&MacroMap::new());
    tracker.track_quartiles(&MacroMap::new());

    assert_eq!(tracker.sink().count("complete"), 1);
}

#[test]
fn test_set_muted_toggles() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_muted(true, &MacroMap::new());
    assert!(tracker.muted());
    assert_eq!(tracker.sink().names(), vec!["mute"]);

    tracker.set_muted(false, &MacroMap::new());
    assert!(!tracker.muted());
    assert_eq!(tracker.sink().names(), vec!["mute", "unmute"]);
}

#[test]
fn test_set_muted_same_value_is_noop() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_muted(false, &MacroMap::new());

    assert!(!tracker.muted());
    assert!(tracker.sink().notifications.is_empty());
    assert!(tracker.sender().calls.is_empty());
}

#[test]
fn test_set_muted_state_is_silent() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_muted_state(true);
    assert!(tracker.muted());
    assert!(tracker.sink().notifications.is_empty());

    tracker.set_muted(false, &MacroMap::new());
    assert_eq!(tracker.sink().names(), vec!["unmute"]);
    assert_eq!(tracker.sender().calls.len(), 1);
}

#[test]
fn test_set_muted_invalid_value_is_noop() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_muted(None, &MacroMap::new());
    tracker.set_muted(serde_json::json!({"foo": "bar"}).as_bool(), &MacroMap::new());

    assert!(!tracker.muted());
    assert!(tracker.sink().notifications.is_empty());
    assert!(tracker.sender().calls.is_empty());
}

#[test]
fn test_initially_muted_unmutes() {
    let ad = inline_ad();
    let mut tracker = VastTracker::with_config(
        &ad,
        &ad.creatives[0],
        RecordingSender::default(),
        RecordingSink::default(),
        TrackerConfig::new().with_muted(true),
    );

    tracker.set_muted(false, &MacroMap::new());

    assert_eq!(tracker.sink().names(), vec!["unmute"]);
}

#[test]
fn test_set_skip_delay() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_skip_delay(123.0);

    assert_eq!(tracker.skip_delay(), Some(123.0));
}

#[test]
fn test_skip_countdown() {
    let mut ad = inline_ad();
    ad.creatives[0].skip_delay = Some(5.0);
    let mut tracker = tracker(&ad);

    tracker.set_progress(2.0, &MacroMap::new());
    assert!(!tracker.is_skippable());
    tracker.set_progress(6.0, &MacroMap::new());
    assert!(tracker.is_skippable());
    tracker.set_progress(7.0, &MacroMap::new());

    let countdown: Vec<Notification> = tracker
        .sink()
        .notifications
        .iter()
        .filter(|(name, _)| name == "skip-countdown")
        .map(|(_, payload)| payload.clone())
        .collect();
    assert_eq!(
        countdown,
        vec![
            Notification::SkipCountdown { remaining: 3.0 },
            Notification::SkipCountdown { remaining: 0.0 },
        ]
    );
}

#[test]
fn test_track_impression_once() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);
    let macros = MacroMap::new().with(Macro::ServerSide, "0");

    tracker.track_impression(&macros);
    assert!(tracker.impressed());
    tracker.track_impression(&macros);
    assert!(tracker.impressed());

    let calls = &tracker.sender().calls;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].templates, ad.impression_url_templates);
    assert_eq!(calls[0].macros, macros);
    assert_eq!(calls[1].templates, declared(&ad, "creativeView"));
    assert_eq!(tracker.sink().count("creativeView"), 1);
}

#[test]
fn test_impression_templates_pass_through_unchanged() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.track_urls(&ad.impression_url_templates, &MacroMap::new(), TrackOptions::default());

    let expected = vec![
        UrlTemplate::new(
            "sample-impression1",
            "http://example.com/impression1_asset:[ASSETURI]_[CACHEBUSTING]",
        ),
        UrlTemplate::new("sample-impression2", "http://example.com/impression2_[random]"),
        UrlTemplate::new("sample-impression3", "//example.com/impression3_[RANDOM]"),
    ];
    assert_eq!(tracker.sender().calls[0].templates, expected);
}

#[test]
fn test_convert_to_timecode() {
    assert_eq!(Tracker::convert_to_timecode(3600.0 + 1200.0 + 36.0 + 0.123), "01:20:36.123");
}

#[test]
fn test_error_forwards_error_templates() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.error(&expected_macros(), false);

    let call = &tracker.sender().calls[0];
    assert_eq!(
        call.templates,
        vec![UrlTemplate::from_url("http://example.com/error_[ERRORCODE]")]
    );
    assert_eq!(call.macros, expected_macros());
    assert_eq!(call.options, TrackOptions { is_custom_code: false });
}

#[test]
fn test_error_with_code_matches_error() {
    let ad = inline_ad();

    let mut with_code = tracker(&ad);
    with_code.error_with_code("1234", true);

    let mut explicit = tracker(&ad);
    explicit.error(&MacroMap::new().with(Macro::ErrorCode, "1234"), true);

    assert_eq!(with_code.sender().calls, explicit.sender().calls);
    assert!(with_code.sender().calls[0].options.is_custom_code);
}

#[test]
fn test_lifecycle_events_notify_without_urls() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_paused(true, &MacroMap::new());
    tracker.set_paused(true, &MacroMap::new());
    tracker.set_paused(false, &MacroMap::new());

    assert_eq!(
        tracker.sink().notifications,
        vec![
            ("pause".to_string(), Notification::Empty),
            ("resume".to_string(), Notification::Empty),
        ]
    );
    assert!(tracker.sender().calls.is_empty());
}

#[test]
fn test_lifecycle_notifications_can_be_disabled() {
    let ad = inline_ad();
    let mut tracker = VastTracker::with_config(
        &ad,
        &ad.creatives[0],
        RecordingSender::default(),
        RecordingSink::default(),
        TrackerConfig::new().with_lifecycle_notifications(false),
    );

    tracker.set_paused(true, &MacroMap::new());
    tracker.skip(&MacroMap::new());

    assert!(tracker.sink().notifications.is_empty());
}

#[test]
fn test_close_linear_falls_back_to_close() {
    let mut ad = inline_ad();
    ad.creatives[0]
        .tracking_events
        .insert("close".to_string(), urls("track", &["close"]));
    let mut tracker = tracker(&ad);

    tracker.close(&MacroMap::new());

    assert_eq!(tracker.sink().names(), vec!["close"]);
    assert_eq!(tracker.sender().calls[0].templates, urls("track", &["close"]));
}

#[test]
fn test_nonlinear_close_and_playhead() {
    let mut ad = inline_ad();
    ad.creatives[0].kind = CreativeKind::Nonlinear;
    ad.creatives[0]
        .tracking_events
        .insert("close".to_string(), urls("track", &["close"]));
    let mut tracker = tracker(&ad);

    tracker.set_progress(5.0, &MacroMap::new());
    tracker.close(&MacroMap::new());

    let last = tracker.sender().calls.last().unwrap();
    assert_eq!(last.templates, urls("track", &["close"]));
    assert!(!last.macros.contains(&Macro::AdPlayhead));
}

#[test]
fn test_expand_fires_legacy_and_player_events() {
    let ad = inline_ad();
    let mut tracker = tracker(&ad);

    tracker.set_expand(true, &MacroMap::new());
    tracker.set_fullscreen(true, &MacroMap::new());

    // None of these are declared on the fixture creative
    assert!(tracker.sink().notifications.is_empty());

    let mut ad = inline_ad();
    for event in ["expand", "playerExpand", "collapse", "playerCollapse"] {
        ad.creatives[0]
            .tracking_events
            .insert(event.to_string(), urls("track", &[event]));
    }
    let mut tracker = VastTracker::new(
        &ad,
        &ad.creatives[0],
        RecordingSender::default(),
        RecordingSink::default(),
    );
    tracker.set_expand(true, &MacroMap::new());
    tracker.set_expand(false, &MacroMap::new());

    assert_eq!(
        tracker.sink().names(),
        vec!["expand", "playerExpand", "collapse", "playerCollapse"]
    );
}

#[test]
fn test_tracker_from_json_model() {
    let ad: Ad = serde_json::from_str(
        r#"{
            "sequence": 2,
            "adServingId": "serving-1",
            "creatives": [{
                "type": "linear",
                "duration": 20,
                "trackingEvents": {"progress-25%": ["http://example.com/q1_[ADPLAYHEAD]_[PODSEQUENCE]"]},
                "mediaFiles": [{"fileURL": "http://example.com/asset.mp4"}]
            }]
        }"#,
    )
    .unwrap();
    let mut tracker = tracker(&ad);

    tracker.set_progress(5.0, &MacroMap::new());

    assert_eq!(tracker.sink().names(), vec!["progress-25%"]);
    let macros = &tracker.sender().calls[0].macros;
    assert_eq!(macros.get(&Macro::PodSequence), Some("2"));
    assert_eq!(macros.get(&Macro::AdServingId), Some("serving-1"));
    assert_eq!(macros.get(&Macro::AssetUri), Some("http://example.com/asset.mp4"));
    assert_eq!(macros.get(&Macro::AdPlayhead), Some("00:00:05.000"));
}
