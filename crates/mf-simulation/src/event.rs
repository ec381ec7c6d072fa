use mf_core::EntityId;

use crate::director::{BacklashTarget, WardenEvent};

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    // Director
    /// The Warden fired an event.
    WardenFired {
        /// The selected event.
        event: WardenEvent,
        /// Chapter index observed at firing time.
        chapter: usize,
        /// Privilege level observed at firing time.
        privilege: u32,
    },
    /// The Warden punished an executed code fragment.
    Backlash {
        /// The modified target.
        target: BacklashTarget,
        /// The executed modifier value.
        value: f32,
    },

    // Hostiles
    /// A hunter entered the sector.
    HunterSpawned {
        /// The new hunter.
        hunter: EntityId,
    },
    /// A hunter touched the player.
    PlayerCaught {
        /// The hunter that caught the player.
        hunter: EntityId,
    },

    // World
    /// The player interacted with an entity.
    Interacted {
        /// The entity interacted with.
        entity: EntityId,
    },
    /// An interactive was corrupted by the Warden.
    EntityCorrupted {
        /// The corrupted entity.
        entity: EntityId,
    },
    /// A wall was shifted by environmental mimicry.
    WallShifted {
        /// The moved wall.
        wall: EntityId,
    },
    /// A ledger key changed value.
    LedgerChanged {
        /// The changed key.
        key: String,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::HunterSpawned { hunter } | Self::PlayerCaught { hunter } => *hunter == id,
            Self::Interacted { entity } | Self::EntityCorrupted { entity } => *entity == id,
            Self::WallShifted { wall } => *wall == id,
            Self::WardenFired { .. } | Self::Backlash { .. } | Self::LedgerChanged { .. } => false,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a level session.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Events the Warden fired, in order.
    pub fn warden_firings(&self) -> impl Iterator<Item = &SimEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::WardenFired { .. }))
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
