use crate::render::{bar_width, Indicator, Renderer};

const PLACEHOLDER: &str = "--";

/// Everything currently on screen. Values stay until a render overwrites
/// them, so a failed poll leaves the last good readings visible.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub clock: String,
    pub uptime: String,
    pub indicator: Indicator,
    pub indicator_label: String,
    pub cpu_usage: String,
    pub cpu_bar: f64,
    pub cpu_freq: String,
    pub cpu_temp: String,
    pub mem_usage: String,
    pub mem_bar: f64,
    pub mem_detail: String,
    pub ip: String,
    pub network_name: String,
    pub upload: String,
    pub download: String,
    pub last_update: String,
}

impl Default for DashboardView {
    fn default() -> Self {
        let dash = || PLACEHOLDER.to_string();
        Self {
            clock: dash(),
            uptime: dash(),
            indicator: Indicator::Unknown,
            indicator_label: dash(),
            cpu_usage: dash(),
            cpu_bar: 0.0,
            cpu_freq: dash(),
            cpu_temp: dash(),
            mem_usage: dash(),
            mem_bar: 0.0,
            mem_detail: dash(),
            ip: dash(),
            network_name: dash(),
            upload: dash(),
            download: dash(),
            last_update: dash(),
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bar fill as a 0.0..=1.0 ratio. Out-of-range readings are clamped.
    pub fn cpu_ratio(&self) -> f64 {
        ratio(self.cpu_bar)
    }

    pub fn mem_ratio(&self) -> f64 {
        ratio(self.mem_bar)
    }

    /// Plain `label: value` rows, used by the one-shot mode.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("time: {}", self.clock),
            format!("uptime: {}", self.uptime),
            format!("oled: {}", self.indicator_label),
            format!(
                "cpu: {} ({}) {} {}",
                self.cpu_usage,
                bar_width(self.cpu_bar),
                self.cpu_freq,
                self.cpu_temp
            ),
            format!(
                "memory: {} ({}) {}",
                self.mem_usage,
                bar_width(self.mem_bar),
                self.mem_detail
            ),
            format!("ip: {}", self.ip),
            format!("network: {}", self.network_name),
            format!("upload: {}", self.upload),
            format!("download: {}", self.download),
            format!("last update: {}", self.last_update),
        ]
    }
}

fn ratio(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    (percent / 100.0).clamp(0.0, 1.0)
}

impl Renderer for DashboardView {
    fn set_clock(&mut self, text: &str) {
        self.clock = text.to_string();
    }

    fn set_uptime(&mut self, text: &str) {
        self.uptime = text.to_string();
    }

    fn set_indicator(&mut self, indicator: Indicator, label: &str) {
        self.indicator = indicator;
        self.indicator_label = label.to_string();
    }

    fn set_cpu_usage(&mut self, text: &str) {
        self.cpu_usage = text.to_string();
    }

    fn set_cpu_bar(&mut self, percent: f64) {
        self.cpu_bar = percent;
    }

    fn set_cpu_freq(&mut self, text: &str) {
        self.cpu_freq = text.to_string();
    }

    fn set_cpu_temp(&mut self, text: &str) {
        self.cpu_temp = text.to_string();
    }

    fn set_mem_usage(&mut self, text: &str) {
        self.mem_usage = text.to_string();
    }

    fn set_mem_bar(&mut self, percent: f64) {
        self.mem_bar = percent;
    }

    fn set_mem_detail(&mut self, text: &str) {
        self.mem_detail = text.to_string();
    }

    fn set_ip(&mut self, text: &str) {
        self.ip = text.to_string();
    }

    fn set_network_name(&mut self, text: &str) {
        self.network_name = text.to_string();
    }

    fn set_upload(&mut self, text: &str) {
        self.upload = text.to_string();
    }

    fn set_download(&mut self, text: &str) {
        self.download = text.to_string();
    }

    fn set_last_update(&mut self, text: &str) {
        self.last_update = text.to_string();
    }
}
