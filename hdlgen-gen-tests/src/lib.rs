#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use std::fs;
    use std::path::PathBuf;

    fn design_dir(name: &str) -> PathBuf {
        PathBuf::from(env!("OUT_DIR")).join(name)
    }

    fn lines(dir: &str, file: &str) -> Vec<String> {
        fs::read_to_string(design_dir(dir).join(file))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn read(dir: &str, file: &str) -> String {
        fs::read_to_string(design_dir(dir).join(file)).unwrap()
    }

    #[test]
    fn counter_bank_files() {
        assert_eq!(
            lines("counter_bank/vhdl", "files.txt"),
            vec![
                "memory/Register_bit.vhd",
                "circuit/toggle.vhd",
                "circuit/counter_bank.vhd",
            ]
        );
        assert_eq!(
            lines("counter_bank/verilog", "files.txt"),
            vec![
                "memory/Register_bit.v",
                "circuit/toggle.v",
                "circuit/counter_bank.v",
            ]
        );
    }

    #[test]
    fn counter_bank_warnings() {
        let expected = vec![
            "counter_bank: Found an unconnected output pin, tied the pin to ground! (Output Pin \"unused\")",
        ];
        assert_eq!(lines("counter_bank/vhdl", "warnings.txt"), expected);
        assert_eq!(lines("counter_bank/verilog", "warnings.txt"), expected);
    }

    #[test]
    fn shared_toggle_is_instantiated_twice() {
        let top = read("counter_bank/vhdl", "circuit/counter_bank.vhd");

        assert!(top.contains("ENTITY counter_bank IS"));
        assert!(top.contains("SUBCIRCUIT_1 : ENTITY work.toggle"));
        assert!(top.contains("SUBCIRCUIT_2 : ENTITY work.toggle"));
        assert_eq!(top.matches(": ENTITY work.toggle").count(), 2);
        assert!(top.contains("LOGISIM_CLOCK_TREE_0 => LOGISIM_CLOCK_TREE_0"));
    }

    #[test]
    fn clock_tree_is_threaded_through_the_hierarchy() {
        let top = read("counter_bank/vhdl", "circuit/counter_bank.vhd");
        let toggle = read("counter_bank/vhdl", "circuit/toggle.vhd");

        for text in [&top, &toggle] {
            assert!(text.contains("LOGISIM_CLOCK_TREE_0 : IN std_logic_vector( 4 DOWNTO 0 )"));
        }
        assert!(toggle.contains("s_LOGISIM_NET_2 <= LOGISIM_CLOCK_TREE_0(0);"));
        assert!(toggle.contains("s_LOGISIM_NET_1 <= NOT(s_LOGISIM_NET_0);"));
        assert!(toggle.contains(": ENTITY work.Register_bit"));
    }

    #[test]
    fn dangling_top_pin_becomes_an_output_bubble() {
        let top = read("counter_bank/verilog", "circuit/counter_bank.v");

        assert!(top.contains("module counter_bank"));
        assert!(top.contains("output wire LOGISIM_OUTPUT_BUBBLES"));
        assert!(top.contains("toggle SUBCIRCUIT_1 ("));
        assert!(top.contains(".LOGISIM_CLOCK_TREE_0(LOGISIM_CLOCK_TREE_0)"));
        assert!(top.contains("endmodule"));
    }

    #[test]
    fn global_tick_clocks_from_one_input() {
        let toggle = read("counter_bank_global_tick", "circuit/toggle.v");
        let top = read("counter_bank_global_tick", "circuit/counter_bank.v");

        for text in [&top, &toggle] {
            assert!(text.contains("input wire [4:0] LOGISIM_CLOCK_TREE_0"));
            assert!(text.contains("input wire FPGA_GlobalClock"));
        }
        assert!(toggle.contains("assign s_LOGISIM_NET_2 = FPGA_GlobalClock;"));
    }

    #[test]
    fn selector_files() {
        let expected = vec![
            "plexers/Multiplexer_bus_4.vhd",
            "plexers/Decoder_4.vhd",
            "circuit/selector.vhd",
        ];
        assert_eq!(lines("selector/vhdl", "files.txt"), expected);
        assert!(lines("selector/vhdl", "warnings.txt").is_empty());

        let mux = read("selector/vhdl", "plexers/Multiplexer_bus_4.vhd");
        assert!(mux.contains("ENTITY Multiplexer_bus_4 IS"));
        assert!(mux.contains("NrOfBits"));
    }

    #[test]
    fn selector_verilog() {
        assert_eq!(
            lines("selector/verilog", "files.txt"),
            vec![
                "plexers/Multiplexer_bus_4.v",
                "plexers/Decoder_4.v",
                "circuit/selector.v",
            ]
        );

        let top = read("selector/verilog", "circuit/selector.v");
        assert!(top.contains("input wire [1:0] sel"));
        assert!(top.contains("output wire [7:0] y"));
        assert!(top.contains("PLEXERS_1"));
        assert!(top.contains("PLEXERS_2"));
        assert!(top.contains("Decoder_4 PLEXERS_2 ("));
    }
}
