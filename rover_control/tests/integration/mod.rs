mod bindings;
mod config_loading;
mod drive_scenarios;
mod output_bounds;
mod sensor_scenarios;
