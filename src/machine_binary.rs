use crate::{
    config::{IdBig, MAX_STATES, NUM_FIELDS},
    transition_binary::{TransitionBinary, TransitionType, TRANSITION_BINARY_UNUSED},
};

/// Holds the transitions for one turing machine. \
/// This usually would be a table of 2 * n_states fields, having A0 A1 in the first line.
/// As state 0 is the halt state and to avoid number shifting to access the data for each state,
/// the line 0 is unused. For faster access, the 2 field wide table is reduced to a single
/// dimensional array, with access by state*2 + read symbol, e.g. C1 is field 3*2+1 = 7. \
/// For performance reasons, this is an Array instead of a Vec.
pub type TransitionTableBinaryArray1D = [TransitionBinary; NUM_FIELDS];
pub const TRANSITION_TABLE_BINARY_DEFAULT: TransitionTableBinaryArray1D =
    [TRANSITION_BINARY_UNUSED; NUM_FIELDS];
const FILTER_TABLE_N_STATES: TransitionType = 0b0000_1111;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineBinary {
    /// Transition\[0\] is used for additional information \
    /// n_states: bits 0-3: Always set with new() variants
    pub transitions: TransitionTableBinaryArray1D,
}

impl MachineBinary {
    /// Creates a new transition table and stores the n_states.
    pub fn new_with_n_states(
        transitions: TransitionTableBinaryArray1D,
        n_states: usize,
    ) -> MachineBinary {
        let mut table = Self { transitions };
        table.set_n_states(n_states);
        table
    }

    /// Creates a new empty transition table which gets filled later.
    pub fn new_default(n_states: usize) -> MachineBinary {
        let mut table = Self {
            transitions: TRANSITION_TABLE_BINARY_DEFAULT,
        };
        table.set_n_states(n_states);
        table
    }

    /// new from transitions as String tuple
    /// # Panics
    /// Panics if wrong format
    pub fn from_string_tuple(transitions_as_str: &[(&str, &str)]) -> Self {
        // convert to TM standard
        let mut v = Vec::new();
        for t in transitions_as_str {
            v.push(format!("{}{}", t.0, t.1));
        }
        let s = v.join("_");
        Self::try_from_standard_tm_text_format(&s).expect("Wrong format")
    }

    /// Creates the transition table from the Standard TM Text Format or returns an error. \
    /// <https://www.sligocki.com/2022/10/09/standard-tm-format.html>
    ///
    /// # Arguments
    /// * `standard_tm_text_format` - e.g. "1RB0LB_1LA0RA"
    ///
    /// # Examples
    /// ```
    /// # use bb_nonhalt::machine_binary::MachineBinary;
    /// let tm_in = "1RB0LB_1LA0RA";
    /// let t = MachineBinary::try_from_standard_tm_text_format(tm_in).unwrap();
    /// let tm_out = t.to_standard_tm_text_format();
    /// assert_eq!(tm_in, tm_out);
    /// ```
    pub fn try_from_standard_tm_text_format(
        standard_tm_text_format: &str,
    ) -> Result<Self, &'static str> {
        let transition_tuples: Vec<&str> = standard_tm_text_format.split('_').collect();
        if transition_tuples.len() > MAX_STATES {
            return Err("The number of table states exceeds MAX_STATES!");
        }
        let mut transitions = TRANSITION_TABLE_BINARY_DEFAULT;
        for (line, tuple) in transition_tuples.iter().enumerate() {
            if tuple.len() != 6 {
                return Err("Expected a format like '1RB1LC_1RC1RB_1RD0LE_1LA1LD_1RZ0LA'. \
                    Each separated transition line must hold two transitions of 3 chars.");
            }
            let bytes = tuple.as_bytes();
            for symbol in 0..2 {
                let tr: [u8; 3] = bytes[symbol * 3..symbol * 3 + 3].try_into().unwrap();
                transitions[(line + 1) * 2 + symbol] = match TransitionBinary::try_new(tr) {
                    Ok(t) => t,
                    Err(_) => return Err("Transition could not be parsed."),
                };
            }
        }

        Ok(Self::new_with_n_states(transitions, transition_tuples.len()))
    }

    /// Returns the transition table as standard TM Text format. Display returns this.
    pub fn to_standard_tm_text_format(&self) -> String {
        let mut transition_texts = Vec::new();
        for fields in self.transitions_used().chunks(2) {
            transition_texts.push(format!("{}{}", fields[0], fields[1]));
        }

        transition_texts.join("_")
    }

    /// Returns the transition table as formatted table (for print output).
    pub fn to_table_string(&self, show_header_0_1: bool) -> String {
        let states = self.n_states();
        let mut s = String::new();
        // table header, symbols 0 and 1 can be stated
        // line begins with state as letter
        if show_header_0_1 {
            s.push_str("   0   1\n");
        }

        for (i, t) in self
            .transitions
            .iter()
            .skip(2)
            .step_by(2)
            .enumerate()
            .take(states)
        {
            s.push((i as u8 + b'A') as char);
            s.push(' ');
            // transition 0
            s.push_str(&t.to_string());
            s.push(' ');
            // transition 1
            s.push_str(&self.transitions[(i + 1) * 2 + 1].to_string());
            if i + 1 < states {
                s.push('\n');
            }
        }

        s
    }

    /// Returns the transition for the array id, which is state * 2 + symbol. A0 = 2.
    #[inline]
    pub fn transition(&self, array_id: usize) -> TransitionBinary {
        self.transitions[array_id]
    }

    // Returns the transition for state (numeric A=1, B=2 etc.) and read symbol.
    pub fn transition_for_state_symbol(&self, state: usize, symbol: usize) -> TransitionBinary {
        self.transitions[state * 2 + symbol]
    }

    pub fn transition_start(&self) -> TransitionBinary {
        self.transitions[2]
    }

    /// Returns the used section of the transition table, which is from 2..n_states * 2 + 2.
    pub fn transitions_used(&self) -> &[TransitionBinary] {
        &self.transitions[2..self.n_states() * 2 + 2]
    }

    /// First array id past the used fields, for loops over the field ids (2..last).
    pub fn fields_used_end(&self) -> usize {
        self.n_states() * 2 + 2
    }

    /// Returns the number of states used.
    #[inline]
    pub fn n_states(&self) -> usize {
        (self.transitions[0].transition & FILTER_TABLE_N_STATES) as usize
    }

    /// Sets the n_states in the first array element. Expects states not to be set, so only during initialization.
    fn set_n_states(&mut self, n_states: usize) {
        self.transitions[0].transition |= n_states as TransitionType;
    }

    /// Returns the machine with the direction of every transition swapped (L <-> R).
    /// A left bouncer of the original machine is a right bouncer of the mirrored machine.
    pub fn mirrored(&self) -> Self {
        let mut mirrored = *self;
        for field_id in 2..self.fields_used_end() {
            mirrored.transitions[field_id] = self.transitions[field_id].mirrored();
        }

        mirrored
    }

    /// Returns true if the machine has at least one halting transition (undefined counts).
    pub fn has_halt_transition(&self) -> bool {
        self.transitions_used().iter().any(|t| t.is_halt())
    }

    // Returns the machine table field name from the transition array id in an 1D-array, e.g. 2 -> A0.
    pub fn array_id_to_field_name(arr_id: usize) -> String {
        let state = ((arr_id / 2) as u8 + b'A' - 1) as char;
        let symbol = ((arr_id & 1) as u8 + b'0') as char;
        format!("{state}{symbol}")
    }
}

impl Default for MachineBinary {
    fn default() -> Self {
        Self {
            transitions: TRANSITION_TABLE_BINARY_DEFAULT,
        }
    }
}

impl TryFrom<&str> for MachineBinary {
    type Error = &'static str;

    fn try_from(tm_text_format: &str) -> Result<Self, Self::Error> {
        Self::try_from_standard_tm_text_format(tm_text_format)
    }
}

impl std::fmt::Display for MachineBinary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_standard_tm_text_format())
    }
}

/// A machine together with its id in the seed database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineId {
    id: IdBig,
    machine: MachineBinary,
}

impl MachineId {
    pub fn new(id: IdBig, machine: MachineBinary) -> Self {
        Self { id, machine }
    }

    /// For machines which do not come from the seed database (id is meaningless).
    pub fn new_no_id(machine: MachineBinary) -> Self {
        Self {
            id: IdBig::MAX,
            machine,
        }
    }

    pub fn id(&self) -> IdBig {
        self.id
    }

    pub fn machine(&self) -> &MachineBinary {
        &self.machine
    }
}

impl std::fmt::Display for MachineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.id == IdBig::MAX {
            write!(f, "{}", self.machine)
        } else {
            write!(f, "{}: {}", self.id, self.machine)
        }
    }
}

/// Some notable machines used for testing.
#[derive(Debug)]
pub enum NotableMachineBinary {
    /// The BB5 champion, halts after 47,176,870 steps.
    BB5Max,
    /// https://bbchallenge.org/story#bb5
    BB5Steps105,
    EndlessSimple,
}

impl NotableMachineBinary {
    pub fn machine(&self) -> MachineBinary {
        let transitions_text = match self {
            NotableMachineBinary::BB5Max => "1RB1LC_1RC1RB_1RD0LE_1LA1LD_---0LA",
            NotableMachineBinary::BB5Steps105 => "1RB1LC_0LB1LA_1RD1LB_1RE0RD_0RA---",
            NotableMachineBinary::EndlessSimple => "0RA---",
        };

        MachineBinary::try_from(transitions_text).unwrap()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn machine_text_format_round_trip() {
        let tm_in = "1RB1LC_1RC1RB_1RD0LE_1LA1LD_---0LA";
        let machine = MachineBinary::try_from(tm_in).unwrap();
        assert_eq!(5, machine.n_states());
        assert_eq!(tm_in, machine.to_standard_tm_text_format());
        // A0 is 1RB
        assert_eq!("1RB", machine.transition_start().to_string());
        // E0 is the undefined halt
        assert!(machine.transition_for_state_symbol(5, 0).is_halt());
        assert!(machine.has_halt_transition());
    }

    #[test]
    fn machine_mirrored_swaps_all_directions() {
        let machine = MachineBinary::try_from("1RB1LC_1RC1RB_1RD0LE_1LA1LD_---0LA").unwrap();
        let mirrored = machine.mirrored();
        assert_eq!(
            "1LB1RC_1LC1LB_1LD0RE_1RA1RD_---0RA",
            mirrored.to_standard_tm_text_format()
        );
        // mirroring twice is the original machine
        assert_eq!(machine, mirrored.mirrored());
    }

    #[test]
    fn machine_from_string_tuple() {
        let machine = MachineBinary::from_string_tuple(&[("1RB", "0LB"), ("1LA", "0RA")]);
        assert_eq!(2, machine.n_states());
        assert_eq!("1RB0LB_1LA0RA", machine.to_standard_tm_text_format());
    }
}
