use std::fmt::Display;

/// One parsed reading destined for a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelUpdate {
    pub channel: usize,
    pub value: i32,
}

impl Display for ChannelUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(ChannelUpdate: channel={}, value={})",
            self.channel, self.value
        )
    }
}

/// One sampling tick from the controller: whitespace-separated integer
/// tokens, token position = channel index. Tokens that fail to parse are
/// dropped, electrical noise on the line shows up as garbage tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFrame {
    readings: Vec<Option<i32>>,
}

impl SampleFrame {
    /// Parse one serial line into per-channel readings.
    pub fn parse_line(line: &str) -> Self {
        let readings = line
            .split_whitespace()
            .map(|token| token.parse::<i32>().ok())
            .collect();
        Self { readings }
    }

    /// The updates this tick produced, skipping unparseable positions.
    pub fn updates(&self) -> impl Iterator<Item = ChannelUpdate> + '_ {
        self.readings
            .iter()
            .enumerate()
            .filter_map(|(channel, reading)| reading.map(|value| ChannelUpdate { channel, value }))
    }
}
