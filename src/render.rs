use chrono::{DateTime, Local};

use crate::config::Labels;
use crate::status::StatusSnapshot;

pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Visual state of the OLED status indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Indicator {
    #[default]
    Unknown,
    Online,
    Offline,
}

/// One setter per display target on the dashboard.
pub trait Renderer {
    fn set_clock(&mut self, text: &str);
    fn set_uptime(&mut self, text: &str);
    fn set_indicator(&mut self, indicator: Indicator, label: &str);
    fn set_cpu_usage(&mut self, text: &str);
    /// `percent` is the raw value, drawn as the bar width.
    fn set_cpu_bar(&mut self, percent: f64);
    fn set_cpu_freq(&mut self, text: &str);
    fn set_cpu_temp(&mut self, text: &str);
    fn set_mem_usage(&mut self, text: &str);
    fn set_mem_bar(&mut self, percent: f64);
    fn set_mem_detail(&mut self, text: &str);
    fn set_ip(&mut self, text: &str);
    fn set_network_name(&mut self, text: &str);
    fn set_upload(&mut self, text: &str);
    fn set_download(&mut self, text: &str);
    fn set_last_update(&mut self, text: &str);
}

/// Apply every field of `snapshot` to `renderer`. `now` stamps the
/// last-updated label; the server's own `time_str` goes to the clock only.
pub fn render(
    snapshot: &StatusSnapshot,
    labels: &Labels,
    now: DateTime<Local>,
    renderer: &mut impl Renderer,
) {
    renderer.set_clock(&snapshot.time_str);
    renderer.set_uptime(&snapshot.uptime);

    if snapshot.oled_connected {
        renderer.set_indicator(Indicator::Online, &labels.online);
    } else {
        renderer.set_indicator(Indicator::Offline, &labels.offline);
    }

    renderer.set_cpu_usage(&format_percent(snapshot.cpu_usage));
    renderer.set_cpu_freq(&format_freq(snapshot.cpu_freq));
    renderer.set_cpu_temp(&snapshot.cpu_temp);
    renderer.set_cpu_bar(snapshot.cpu_usage);

    renderer.set_mem_usage(&format_percent(snapshot.mem_usage));
    renderer.set_mem_detail(&format_mem_detail(snapshot.mem_used, snapshot.mem_total));
    renderer.set_mem_bar(snapshot.mem_usage);

    renderer.set_ip(&snapshot.ip);
    renderer.set_network_name(&snapshot.network_name);

    // Fewer than two tokens leaves both speed labels as they were.
    if let Some((upload, download)) = split_speed(&snapshot.net_speed) {
        renderer.set_upload(upload);
        renderer.set_download(download);
    }

    renderer.set_last_update(&now.format(LAST_UPDATE_FORMAT).to_string());
}

/// The failure path touches the indicator and nothing else.
pub fn render_failure(labels: &Labels, renderer: &mut impl Renderer) {
    renderer.set_indicator(Indicator::Offline, &labels.connection_failed);
}

/// `42.36` → `"42.4%"`, `12.25` → `"12.3%"`
pub fn format_percent(value: f64) -> String {
    format!("{}%", to_fixed(value, 1))
}

/// `1499.6` → `"1500 MHz"`. Halves round away from zero.
pub fn format_freq(mhz: f64) -> String {
    format!("{} MHz", mhz.round() as i64)
}

pub fn format_mem_detail(used: f64, total: f64) -> String {
    format!("{} GB / {} GB", to_fixed(used, 1), to_fixed(total, 1))
}

/// Every fraction digit an `f64` can have; the smallest subnormal
/// is 2^-1074.
const F64_FRACTION_DIGITS: usize = 1074;

/// `value` with `digits` fraction digits. An exact decimal tie rounds away
/// from zero (`3.25` → `"3.3"`), where `{:.1}` would round to even.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let exact = format!("{:.*}", F64_FRACTION_DIGITS, value.abs());
    let Some((int_part, frac)) = exact.split_once('.') else {
        // NaN and infinities
        return format!("{:.*}", digits, value);
    };
    let Some(rest) = frac.get(digits..) else {
        return format!("{:.*}", digits, value);
    };
    let tie = rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0');
    if !tie {
        return format!("{:.*}", digits, value);
    }

    let rounded = increment_last_digit(int_part, &frac[..digits]);
    if value.is_sign_negative() {
        format!("-{}", rounded)
    } else {
        rounded
    }
}

/// `int_part.frac` plus one unit in the last kept place.
fn increment_last_digit(int_part: &str, frac: &str) -> String {
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac.bytes())
        .map(|b| b - b'0')
        .collect();

    let mut carry = true;
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            carry = false;
            break;
        }
    }
    if carry {
        digits.insert(0, 1);
    }

    let point = digits.len() - frac.len();
    let mut out = String::with_capacity(digits.len() + 1);
    for (i, d) in digits.iter().enumerate() {
        if i == point {
            out.push('.');
        }
        out.push(char::from(b'0' + d));
    }
    out
}

/// Raw percent as a width, `42.36` → `"42.36%"`, `50.0` → `"50%"`.
pub fn bar_width(percent: f64) -> String {
    format!("{}%", percent)
}

/// First two whitespace-separated tokens as (upload, download).
pub fn split_speed(net_speed: &str) -> Option<(&str, &str)> {
    let mut tokens = net_speed.split_whitespace();
    let upload = tokens.next()?;
    let download = tokens.next()?;
    Some((upload.trim(), download.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::sample_snapshot;
    use chrono::TimeZone;

    /// Records every setter call in order.
    #[derive(Debug, Default)]
    struct RecordingRenderer {
        pub calls: Vec<(&'static str, String)>,
    }

    impl RecordingRenderer {
        pub fn get(&self, target: &str) -> Option<&str> {
            self.calls
                .iter()
                .rev()
                .find(|(t, _)| *t == target)
                .map(|(_, v)| v.as_str())
        }

        fn push(&mut self, target: &'static str, value: impl Into<String>) {
            self.calls.push((target, value.into()));
        }
    }

    impl Renderer for RecordingRenderer {
        fn set_clock(&mut self, text: &str) {
            self.push("clock", text);
        }
        fn set_uptime(&mut self, text: &str) {
            self.push("uptime", text);
        }
        fn set_indicator(&mut self, indicator: Indicator, label: &str) {
            self.push("indicator", format!("{:?}:{}", indicator, label));
        }
        fn set_cpu_usage(&mut self, text: &str) {
            self.push("cpu_usage", text);
        }
        fn set_cpu_bar(&mut self, percent: f64) {
            self.push("cpu_bar", bar_width(percent));
        }
        fn set_cpu_freq(&mut self, text: &str) {
            self.push("cpu_freq", text);
        }
        fn set_cpu_temp(&mut self, text: &str) {
            self.push("cpu_temp", text);
        }
        fn set_mem_usage(&mut self, text: &str) {
            self.push("mem_usage", text);
        }
        fn set_mem_bar(&mut self, percent: f64) {
            self.push("mem_bar", bar_width(percent));
        }
        fn set_mem_detail(&mut self, text: &str) {
            self.push("mem_detail", text);
        }
        fn set_ip(&mut self, text: &str) {
            self.push("ip", text);
        }
        fn set_network_name(&mut self, text: &str) {
            self.push("network_name", text);
        }
        fn set_upload(&mut self, text: &str) {
            self.push("upload", text);
        }
        fn set_download(&mut self, text: &str) {
            self.push("download", text);
        }
        fn set_last_update(&mut self, text: &str) {
            self.push("last_update", text);
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 14, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_render_maps_every_field() {
        let mut r = RecordingRenderer::default();
        render(&sample_snapshot(), &Labels::default(), fixed_now(), &mut r);

        assert_eq!(r.get("clock"), Some("14:03:27"));
        assert_eq!(r.get("uptime"), Some("01:12:09"));
        assert_eq!(r.get("indicator"), Some("Online:online"));
        assert_eq!(r.get("cpu_usage"), Some("42.4%"));
        assert_eq!(r.get("cpu_bar"), Some("42.36%"));
        assert_eq!(r.get("cpu_freq"), Some("1500 MHz"));
        assert_eq!(r.get("cpu_temp"), Some("48.3°C"));
        assert_eq!(r.get("mem_usage"), Some("37.8%"));
        assert_eq!(r.get("mem_bar"), Some("37.81%"));
        assert_eq!(r.get("mem_detail"), Some("1.5 GB / 3.8 GB"));
        assert_eq!(r.get("ip"), Some("192.168.1.23"));
        assert_eq!(r.get("network_name"), Some("home-wifi"));
        assert_eq!(r.get("upload"), Some("1.2kbps"));
        assert_eq!(r.get("download"), Some("3.4kbps"));
        assert_eq!(r.get("last_update"), Some("2026-10-14 09:30:05"));
    }

    #[test]
    fn test_render_offline_oled() {
        let mut snapshot = sample_snapshot();
        snapshot.oled_connected = false;
        let mut r = RecordingRenderer::default();
        render(&snapshot, &Labels::default(), fixed_now(), &mut r);
        assert_eq!(r.get("indicator"), Some("Offline:offline"));
    }

    #[test]
    fn test_render_single_speed_token_skips_speed_targets() {
        let mut snapshot = sample_snapshot();
        snapshot.net_speed = "onlyonetoken".to_string();
        let mut r = RecordingRenderer::default();
        render(&snapshot, &Labels::default(), fixed_now(), &mut r);
        assert_eq!(r.get("upload"), None);
        assert_eq!(r.get("download"), None);
        // Everything else still lands.
        assert_eq!(r.get("ip"), Some("192.168.1.23"));
    }

    #[test]
    fn test_render_failure_only_touches_indicator() {
        let mut r = RecordingRenderer::default();
        render_failure(&Labels::default(), &mut r);
        assert_eq!(
            r.calls,
            vec![("indicator", "Offline:connection failed".to_string())]
        );
    }

    #[test]
    fn test_render_uses_configured_labels() {
        let labels = Labels {
            online: "在线".to_string(),
            offline: "离线".to_string(),
            connection_failed: "连接失败".to_string(),
        };
        let mut r = RecordingRenderer::default();
        render(&sample_snapshot(), &labels, fixed_now(), &mut r);
        assert_eq!(r.get("indicator"), Some("Online:在线"));
        render_failure(&labels, &mut r);
        assert_eq!(r.get("indicator"), Some("Offline:连接失败"));
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(42.36), "42.4%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(100.0), "100.0%");
        assert_eq!(format_percent(12.25), "12.3%");
        assert_eq!(format_percent(0.25), "0.3%");
    }

    #[test]
    fn test_format_mem_detail_rounds_ties_up() {
        // 3.25 GiB hosts report exactly 3.25.
        assert_eq!(format_mem_detail(1.25, 3.25), "1.3 GB / 3.3 GB");
        assert_eq!(format_mem_detail(1.46, 3.84), "1.5 GB / 3.8 GB");
    }

    #[test]
    fn test_to_fixed_exact_ties() {
        assert_eq!(to_fixed(12.25, 1), "12.3");
        assert_eq!(to_fixed(9.75, 1), "9.8");
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(99.5, 0), "100");
        assert_eq!(to_fixed(9.95, 1), "9.9");
        assert_eq!(to_fixed(-0.25, 1), "-0.3");
        assert_eq!(to_fixed(0.125, 2), "0.13");
    }

    #[test]
    fn test_to_fixed_non_ties_match_format() {
        // 1.005 is stored just below the tie.
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(42.36, 1), "42.4");
        assert_eq!(to_fixed(37.81, 1), "37.8");
        assert_eq!(to_fixed(0.0, 1), "0.0");
        assert_eq!(to_fixed(f64::NAN, 1), "NaN");
    }

    #[test]
    fn test_format_freq_rounds_to_integer() {
        assert_eq!(format_freq(1499.6), "1500 MHz");
        assert_eq!(format_freq(600.0), "600 MHz");
        assert_eq!(format_freq(1200.5), "1201 MHz");
    }

    #[test]
    fn test_bar_width_keeps_raw_value() {
        assert_eq!(bar_width(42.36), "42.36%");
        assert_eq!(bar_width(50.0), "50%");
    }

    #[test]
    fn test_split_speed() {
        assert_eq!(split_speed("1.2kbps 3.4kbps"), Some(("1.2kbps", "3.4kbps")));
        assert_eq!(split_speed("  1.2K   3.4K "), Some(("1.2K", "3.4K")));
        assert_eq!(split_speed(" N/A   N/A"), Some(("N/A", "N/A")));
        assert_eq!(split_speed("onlyonetoken"), None);
        assert_eq!(split_speed(""), None);
    }
}
