//! Per-show voice profiles for promotional copy.

/// Tone template for one show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceProfile {
    /// Opening words of the lead line.
    pub lead: &'static str,
    /// Header above the bullet list.
    pub section: &'static str,
    /// Closing line inviting replies.
    pub close: &'static str,
    pub tags: &'static str,
}

impl VoiceProfile {
    /// Single-line rendering used inside generation prompts.
    pub fn describe(&self) -> String {
        format!(
            "lead: {}. section: {}. close: {}. tags: {}",
            self.lead.trim_end_matches(':'),
            self.section.trim_end_matches(':'),
            self.close,
            self.tags
        )
    }
}

const SHOW_VOICES: &[(&str, VoiceProfile)] = &[
    (
        "TWiT",
        VoiceProfile {
            lead: "We just published a new TWiT flagship episode:",
            section: "Here's what we're unpacking:",
            close: "If you listen, tell me what you think.",
            tags: "#TWiT #Podcast #Tech",
        },
    ),
    (
        "SN",
        VoiceProfile {
            lead: "New Security Now! is live:",
            section: "In this episode:",
            close: "I'd especially love your take on the security implications.",
            tags: "#SecurityNow #Cybersecurity #TWiT",
        },
    ),
    (
        "MBW",
        VoiceProfile {
            lead: "New MacBreak Weekly just dropped:",
            section: "What we cover:",
            close: "Let me know which segment hit hardest for you.",
            tags: "#MacBreakWeekly #Apple #TWiT",
        },
    ),
    (
        "WW",
        VoiceProfile {
            lead: "New Windows Weekly is out now:",
            section: "This one covers:",
            close: "Curious what stood out to you most.",
            tags: "#WindowsWeekly #Microsoft #TWiT",
        },
    ),
    (
        "IM",
        VoiceProfile {
            lead: "Fresh Intelligent Machines is now live:",
            section: "In this conversation:",
            close: "I'd love your take after you listen.",
            tags: "#IntelligentMachines #AI #TWiT",
        },
    ),
    (
        "TWiS",
        VoiceProfile {
            lead: "New This Week in Space is live:",
            section: "Here's what we get into:",
            close: "If you're following spaceflight, this one's worth your time.",
            tags: "#ThisWeekInSpace #Space #TWiT",
        },
    ),
    (
        "PLUSSHOWS",
        VoiceProfile {
            lead: "New Club TWiT release just dropped:",
            section: "Here's what's inside:",
            close: "Club members, I'd love your take after you listen.",
            tags: "#ClubTWiT #TWiT #Podcast",
        },
    ),
];

pub const DEFAULT_VOICE: VoiceProfile = VoiceProfile {
    lead: "We just published a new episode on TWiT:",
    section: "Here's what we get into:",
    close: "I'd love your take after you listen.",
    tags: "#TWiT #Podcast #TechNews",
};

/// Voice for a show code. Codes are matched exactly; unknown or empty codes
/// get the network-wide default.
pub fn voice_for(show_code: &str) -> &'static VoiceProfile {
    SHOW_VOICES
        .iter()
        .find(|(code, _)| *code == show_code)
        .map(|(_, voice)| voice)
        .unwrap_or(&DEFAULT_VOICE)
}
