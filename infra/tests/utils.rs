use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use backlog_mcp_infra::commands::Variables;
use backlog_mcp_infra::utils;
use backlog_mcp_infra::utils::reader::{ReadBuffer, Reader};
use backlog_mcp_infra::utils::writer::Writer;

#[non_exhaustive]
pub struct StatusCode;

const INFRA_TEST_APP_NAME: &str = "backlog-mcp-infra-test";

#[allow(dead_code)]
impl StatusCode {
    pub const SUCCESS: i32 = 0;
    pub const INTERNAL_FAILURE: i32 = -1;
    pub const PREPROCESSOR_ERROR: i32 = -3;
}

#[allow(dead_code)]
pub fn get_full_path_for_resource_file(path: &str) -> String {
    let mut resource = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    resource.push(path);
    resource.display().to_string()
}

#[allow(dead_code)]
pub fn compare_write_buffer_with_string(expected_output: &str, actual_output_writer: Writer) {
    let actual_output = actual_output_writer.stripped().unwrap();
    pretty_assertions::assert_eq!(expected_output, actual_output)
}

#[allow(dead_code)]
pub fn payload_reader(payload: &str) -> Reader {
    Reader::new(ReadBuffer::Cursor(Cursor::new(payload.as_bytes().to_vec())))
}

#[allow(dead_code)]
pub fn empty_reader() -> Reader {
    payload_reader("")
}

pub trait CommandTestRunner {
    fn build_args(&self) -> Vec<String>;

    /// Settings variables the commands see, none unless a runner provides them.
    fn variables(&self) -> Variables {
        Variables::Fixed(HashMap::new())
    }

    fn run(&self, writer: &mut Writer, reader: &mut Reader) -> i32 {
        let mut app = clap::Command::new(INFRA_TEST_APP_NAME);

        let args = self.build_args();

        let command_options =
            args.iter()
                .fold(vec![String::from(INFRA_TEST_APP_NAME)], |mut res, arg| {
                    res.push(arg.to_string());
                    res
                });

        let commands = utils::get_infra_commands_with(self.variables());

        let mappings = commands.iter().map(|s| (s.name(), s)).fold(
            HashMap::with_capacity(commands.len()),
            |mut map, entry| {
                map.insert(entry.0, entry.1.as_ref());
                map
            },
        );

        for each in &commands {
            app = app.subcommand(each.command());
        }

        let app = app.get_matches_from(command_options);

        match app.subcommand() {
            Some((name, value)) => {
                if let Some(command) = mappings.get(name) {
                    match (*command).execute(value, writer, reader) {
                        Err(e) => {
                            writer
                                .write_err(format!("Error occurred {e}"))
                                .expect("failed to write to stderr");

                            StatusCode::INTERNAL_FAILURE
                        }
                        Ok(code) => code,
                    }
                } else {
                    StatusCode::PREPROCESSOR_ERROR
                }
            }

            None => StatusCode::PREPROCESSOR_ERROR,
        }
    }
}

#[macro_export]
macro_rules! assert_output_from_str_eq {
    ($expected_output: expr, $actual_output_writer: expr) => {
        $crate::utils::compare_write_buffer_with_string($expected_output, $actual_output_writer)
    };
}
