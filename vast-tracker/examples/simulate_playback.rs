// Simulate a player driving a tracker over a small in-memory ad
//
// Usage: RUST_LOG=debug cargo run --example simulate_playback

use std::collections::BTreeMap;
use vast_tracker::{
    Ad, BeaconSender, Creative, LogSink, Macro, MacroMap, TrackOptions, UrlTemplate, VastTracker,
};

/// Prints every template it is asked to fire
struct PrintSender;

impl BeaconSender for PrintSender {
    fn track(&mut self, templates: &[UrlTemplate], macros: &MacroMap, options: TrackOptions) {
        for template in templates {
            println!("  -> {} (macros: {}, custom code: {})", template.url, macros.len(), options.is_custom_code);
        }
    }
}

fn main() {
    env_logger::init();

    let mut tracking_events = BTreeMap::new();
    for event in ["creativeView", "start", "firstQuartile", "midpoint", "thirdQuartile", "complete", "mute"] {
        tracking_events.insert(
            event.to_string(),
            vec![UrlTemplate::from_url(format!("http://example.com/{}?t=[ADPLAYHEAD]", event))],
        );
    }

    let ad = Ad {
        impression_url_templates: vec![UrlTemplate::from_url("http://example.com/impression")],
        error_url_templates: vec![UrlTemplate::from_url("http://example.com/error_[ERRORCODE]")],
        creatives: vec![Creative {
            duration: 20.0,
            tracking_events,
            ..Creative::default()
        }],
        ..Ad::default()
    };

    let mut tracker = VastTracker::new(&ad, &ad.creatives[0], PrintSender, LogSink);
    let macros = MacroMap::new().with(Macro::ServerSide, "0");

    println!("impression");
    tracker.track_impression(&macros);

    for second in [1.0, 5.0, 10.0, 15.0, 20.0] {
        println!("progress {}s", second);
        tracker.set_progress(second, &macros);
        tracker.track_quartiles(&macros);
        if second == 10.0 {
            tracker.set_muted(true, &macros);
        }
    }

    println!("error");
    tracker.error_with_code("405", false);

    println!("last percentage: {}", tracker.last_percentage());
}
