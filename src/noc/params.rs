use serde::Deserialize;

use crate::engine::Params;
use crate::params;
use crate::sim::config::Config;

use super::error::{ConfigurationError, Result};
use super::types::Plane;
use super::units::{Bandwidth, Bytes, Frequency, Latency};

/// Mesh description as written in the `[mesh]` section of a system config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub prefix: String,
    pub xdim: usize,
    pub ydim: usize,
    pub frequency: Frequency,
    pub x_hop_cycles: u32,
    pub y_hop_cycles: u32,
    pub local_hop_cycles: u32,
    /// 8B covers address, command and a few bits of metadata.
    pub ctrl_flit_size: Bytes,
    pub data_flit_size: Bytes,
    pub router_buffer_entries: u32,
    pub nic_input_buffer_entries: u32,
    pub nic_output_buffer_entries: u32,
    pub route_y_first: bool,
    /// Local ports win arbitration over network ports unless set.
    pub equal_port_priority: bool,
}

impl Config for MeshConfig {}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            prefix: "mesh".to_string(),
            xdim: 2,
            ydim: 2,
            frequency: Frequency::from_hz(2_000_000_000),
            x_hop_cycles: 1,
            y_hop_cycles: 1,
            local_hop_cycles: 1,
            ctrl_flit_size: Bytes::new(8),
            data_flit_size: Bytes::new(36),
            router_buffer_entries: 2,
            nic_input_buffer_entries: 2,
            nic_output_buffer_entries: 2,
            route_y_first: false,
            equal_port_priority: false,
        }
    }
}

/// Parameters shared by every router and every channel adapter of one plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneParams {
    pub link_bw: Bandwidth,
    pub flit_size: Bytes,
    pub router_input_buf: Bytes,
    pub nic_input_buf: Bytes,
    pub nic_output_buf: Bytes,
    pub port_priority_equal: bool,
    pub route_y_first: bool,
}

impl PlaneParams {
    pub fn router_params(&self) -> Params {
        params! {
            "link_bw" => self.link_bw,
            "flit_size" => self.flit_size,
            "input_buf_size" => self.router_input_buf,
            "port_priority_equal" => self.port_priority_equal,
            "route_y_first" => self.route_y_first,
        }
    }

    pub fn adapter_params(&self) -> Params {
        params! {
            "link_bw" => self.link_bw,
            "in_buf_size" => self.nic_input_buf,
            "out_buf_size" => self.nic_output_buf,
        }
    }
}

/// Control planes share one parameter set; the data plane has its own.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneParamSet {
    pub control: PlaneParams,
    pub data: PlaneParams,
}

impl PlaneParamSet {
    pub fn for_plane(&self, plane: Plane) -> &PlaneParams {
        if plane.is_control() {
            &self.control
        } else {
            &self.data
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopLatencies {
    /// East/west hops.
    pub x: Latency,
    /// North/south hops.
    pub y: Latency,
    /// Router to attached endpoint.
    pub local: Latency,
}

/// Everything `MeshTopology::build` needs, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshLayout {
    pub prefix: String,
    pub xdim: usize,
    pub ydim: usize,
    pub latencies: HopLatencies,
    pub planes: PlaneParamSet,
}

impl MeshConfig {
    fn plane(&self, flit: Bytes) -> Result<PlaneParams> {
        let buffer = |entries: u32| {
            flit.times(u64::from(entries)).ok_or_else(|| {
                ConfigurationError::invalid("buffer size", "a size below 2^64 bytes", format!("{entries} x {flit}"))
            })
        };
        let link_bw = Bandwidth::of(self.frequency, flit).ok_or_else(|| {
            ConfigurationError::invalid(
                "link bandwidth",
                "a rate below 2^64 bytes per second",
                format!("{} x {flit}", self.frequency),
            )
        })?;
        Ok(PlaneParams {
            link_bw,
            flit_size: flit,
            router_input_buf: buffer(self.router_buffer_entries)?,
            nic_input_buf: buffer(self.nic_input_buffer_entries)?,
            nic_output_buf: buffer(self.nic_output_buffer_entries)?,
            port_priority_equal: self.equal_port_priority,
            route_y_first: self.route_y_first,
        })
    }

    fn hop(&self, cycles: u32) -> Result<Latency> {
        Latency::from_cycles(cycles, self.frequency).ok_or_else(|| {
            ConfigurationError::invalid(
                "hop latency",
                "a latency below 2^64 picoseconds",
                format!("{cycles} cycles at {}", self.frequency),
            )
        })
    }

    pub fn layout(&self) -> Result<MeshLayout> {
        let buffers = [
            self.router_buffer_entries,
            self.nic_input_buffer_entries,
            self.nic_output_buffer_entries,
        ];
        if let Some(entries) = buffers.into_iter().find(|entries| *entries < 2) {
            return Err(ConfigurationError::invalid(
                "buffer entries",
                "at least 2",
                entries,
            ));
        }
        if self.ctrl_flit_size.get() == 0 || self.data_flit_size.get() == 0 {
            return Err(ConfigurationError::invalid(
                "flit size",
                "a non-zero size",
                "0B",
            ));
        }
        Ok(MeshLayout {
            prefix: self.prefix.clone(),
            xdim: self.xdim,
            ydim: self.ydim,
            latencies: HopLatencies {
                x: self.hop(self.x_hop_cycles)?,
                y: self.hop(self.y_hop_cycles)?,
                local: self.hop(self.local_hop_cycles)?,
            },
            planes: PlaneParamSet {
                control: self.plane(self.ctrl_flit_size)?,
                data: self.plane(self.data_flit_size)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ParamValue;

    #[test]
    fn default_config_matches_kingsley_defaults() {
        let layout = MeshConfig::default().layout().unwrap();
        assert_eq!("500ps", layout.latencies.local.to_string());

        let data = layout.planes.for_plane(Plane::Data).router_params();
        assert_eq!(Some(&ParamValue::Str("72GB/s".into())), data.get("link_bw"));
        assert_eq!(Some(&ParamValue::Str("72B".into())), data.get("input_buf_size"));

        let ctrl = layout.planes.for_plane(Plane::Forward).adapter_params();
        assert_eq!(Some(&ParamValue::Str("16GB/s".into())), ctrl.get("link_bw"));
        assert_eq!(Some(&ParamValue::Str("16B".into())), ctrl.get("out_buf_size"));
    }

    #[test]
    fn parses_mesh_section_from_toml() {
        let section: toml::Value = toml::from_str(
            r#"
            xdim = 4
            ydim = 3
            frequency = "1GHz"
            data_flit_size = "64B"
            y_hop_cycles = 2
            "#,
        )
        .unwrap();
        let config = MeshConfig::from_section(Some(&section)).unwrap();
        assert_eq!(4, config.xdim);
        assert_eq!(Bytes::new(8), config.ctrl_flit_size);

        let layout = config.layout().unwrap();
        assert_eq!(Latency::from_ps(1000), layout.latencies.x);
        assert_eq!(Latency::from_ps(2000), layout.latencies.y);
        assert_eq!("64GB/s", layout.planes.data.link_bw.to_string());
    }

    #[test]
    fn rejects_bandwidth_past_64_bits() {
        let section: toml::Value = toml::from_str(
            r#"
            frequency = "20GHz"
            data_flit_size = "1GB"
            "#,
        )
        .unwrap();
        let config = MeshConfig::from_section(Some(&section)).unwrap();
        assert!(matches!(
            config.layout(),
            Err(ConfigurationError::InvalidValue { what: "link bandwidth", .. })
        ));
    }

    #[test]
    fn rejects_single_entry_buffers() {
        let config = MeshConfig {
            nic_output_buffer_entries: 1,
            ..MeshConfig::default()
        };
        assert!(matches!(
            config.layout(),
            Err(ConfigurationError::InvalidValue { what: "buffer entries", .. })
        ));
    }
}
