/// Named phase boundaries a request passes through (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Validation,
    HealthCheck,
    Queue,
    PdfInfo,
    Render,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Validation => "validation",
            Phase::HealthCheck => "healthCheck",
            Phase::Queue => "queue",
            Phase::PdfInfo => "pdfInfo",
            Phase::Render => "render",
        }
    }
}

/// Discrete, instant events recorded alongside phase spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    FirstImageReady,
    QueueAcquired,
    OverloadReject,
    Error,
}

impl Event {
    pub fn label(self) -> &'static str {
        match self {
            Event::FirstImageReady => "firstImageReady",
            Event::QueueAcquired => "queueAcquired",
            Event::OverloadReject => "overloadReject",
            Event::Error => "error",
        }
    }
}
