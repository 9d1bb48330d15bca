pub const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Senior Centers Dashboard</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0; display: flex; }
    aside { width: 300px; padding: 16px; border-right: 1px solid #ddd; min-height: 100vh; }
    main { flex: 1; padding: 16px; }
    h1 { font-size: 20px; margin-top: 0; }
    h2 { font-size: 14px; text-transform: uppercase; color: #666; margin: 20px 0 8px; }
    hr { border: none; border-top: 1px solid #ddd; margin: 16px 0; }
    label { display: block; font-size: 13px; margin: 6px 0 2px; }
    select, input[type="number"] { width: 100%; box-sizing: border-box; }
    select[multiple] { height: 96px; }
    button { margin-top: 6px; }
    .years { display: flex; gap: 8px; }
    .notice { background: #fff7e0; border: 1px solid #e8cf7a; padding: 8px 12px; margin-bottom: 12px; display: none; }
    .error { background: #fde7e7; border-color: #e79a9a; }
    iframe { border: 1px solid #ddd; }
    table { border-collapse: collapse; margin-top: 16px; font-size: 13px; }
    th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }
    th { background: #f3f3f3; }
  </style>
</head>
<body>
  <aside>
    <h1>Senior Centers</h1>

    <h2>Upload</h2>
    <input type="file" id="upload" accept=".csv,text/csv" />

    <h2>Markers</h2>
    <label><input type="checkbox" id="clustering" checked /> Cluster markers</label>

    <hr />
    <h2>Filter options</h2>
    <label for="filter-column">Add filter column</label>
    <select id="filter-column"></select>
    <button id="add-filter">Add filter</button>
    <div id="filters"></div>

    <div id="year-section" style="display:none">
      <label>Construction year</label>
      <div class="years">
        <input type="number" id="year-min" />
        <input type="number" id="year-max" />
      </div>
    </div>

    <hr />
    <h2>Popup options</h2>
    <label for="popup-fields">Fields shown in popups</label>
    <select id="popup-fields" multiple></select>
  </aside>

  <main>
    <div id="notice" class="notice"></div>
    <iframe id="map" width="1216" height="816" src="/map"></iframe>
    <div id="table"></div>
  </main>

  <script>
    async function post(url, body) {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body),
      });
      if (!res.ok) throw new Error(await res.text());
    }

    function notice(text, isError) {
      const el = document.getElementById('notice');
      el.textContent = text || '';
      el.style.display = text ? 'block' : 'none';
      el.classList.toggle('error', !!isError);
    }

    function selectedOptions(el) {
      return Array.from(el.selectedOptions).map(o => o.value);
    }

    async function refresh() {
      const schema = await (await fetch('/api/schema')).json();

      const columnPicker = document.getElementById('filter-column');
      columnPicker.innerHTML = '';
      for (const col of schema.columns) {
        columnPicker.add(new Option(col, col));
      }

      const popupPicker = document.getElementById('popup-fields');
      popupPicker.innerHTML = '';
      for (const col of schema.columns) {
        const opt = new Option(col, col);
        opt.selected = schema.popup_fields.includes(col);
        popupPicker.add(opt);
      }

      document.getElementById('clustering').checked = schema.clustering;

      const filters = document.getElementById('filters');
      filters.innerHTML = '';
      for (const f of schema.filters) {
        const label = document.createElement('label');
        label.textContent = f.column;
        const sel = document.createElement('select');
        sel.multiple = true;
        for (const value of f.options) {
          const opt = new Option(value, value);
          opt.selected = f.selected.includes(value);
          sel.add(opt);
        }
        sel.addEventListener('change', async () => {
          await post('/api/filter/values', { column: f.column, values: selectedOptions(sel) });
          await refresh();
        });
        filters.append(label, sel);
      }

      const yearSection = document.getElementById('year-section');
      if (schema.year_bounds) {
        yearSection.style.display = 'block';
        const [lo, hi] = schema.year_range || schema.year_bounds;
        const minEl = document.getElementById('year-min');
        const maxEl = document.getElementById('year-max');
        minEl.min = maxEl.min = schema.year_bounds[0];
        minEl.max = maxEl.max = schema.year_bounds[1];
        minEl.value = lo;
        maxEl.value = hi;
      } else {
        yearSection.style.display = 'none';
      }

      if (!schema.uploaded) {
        notice('Upload a CSV file to begin.');
      } else if (schema.matching === 0) {
        notice('No records match the selected filters. Try different filters.');
      } else {
        notice('');
      }

      document.getElementById('map').src = '/map?' + Date.now();
      await renderTable();
    }

    async function renderTable() {
      const view = await (await fetch('/api/table')).json();
      const container = document.getElementById('table');
      container.innerHTML = '';
      if (!view.rows.length) return;
      const table = document.createElement('table');
      const head = table.insertRow();
      for (const col of view.columns) {
        const th = document.createElement('th');
        th.textContent = col;
        head.append(th);
      }
      for (const row of view.rows) {
        const tr = table.insertRow();
        for (const cell of row) tr.insertCell().textContent = cell;
      }
      container.append(table);
    }

    document.getElementById('upload').addEventListener('change', async (event) => {
      const file = event.target.files[0];
      if (!file) return;
      const res = await fetch('/api/upload', { method: 'POST', body: await file.text() });
      if (!res.ok) {
        notice('Upload failed: ' + await res.text() + ' Please re-upload.', true);
        return;
      }
      await refresh();
    });

    document.getElementById('add-filter').addEventListener('click', async () => {
      const column = document.getElementById('filter-column').value;
      if (!column) return;
      await post('/api/filter/column', { column });
      await refresh();
    });

    document.getElementById('clustering').addEventListener('change', async (event) => {
      await post('/api/options', { clustering: event.target.checked });
      await refresh();
    });

    document.getElementById('popup-fields').addEventListener('change', async (event) => {
      await post('/api/options', { popup_fields: selectedOptions(event.target) });
      await refresh();
    });

    for (const id of ['year-min', 'year-max']) {
      document.getElementById(id).addEventListener('change', async () => {
        await post('/api/filter/years', {
          min: Number(document.getElementById('year-min').value),
          max: Number(document.getElementById('year-max').value),
        });
        await refresh();
      });
    }

    refresh();
  </script>
</body>
</html>
"#;
